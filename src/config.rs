use anyhow::{Context, Result};
use std::path::PathBuf;

/// Where link and click maps are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// One JSON file per key under `data_dir`.
    File,
    /// Process memory only; state is lost on exit.
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when displaying short links, e.g. "https://go.example.com"
    /// Must NOT have a trailing slash.
    pub base_url: String,

    pub store_backend: StoreBackend,

    /// Directory for the file backend
    pub data_dir: PathBuf,

    /// Store key holding the code → link map
    pub links_key: String,

    /// Store key holding the code → click history map
    pub clicks_key: String,

    /// How many activity entries are kept in memory
    pub activity_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            base_url: "http://localhost:3000".into(),
            store_backend: StoreBackend::File,
            data_dir: PathBuf::from("./data"),
            links_key: "links".into(),
            clicks_key: "clicks".into(),
            activity_capacity: 200,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(p) => p
                .parse::<u16>()
                .context("PORT must be a valid port number (1–65535)")?,
            None => defaults.port,
        };

        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let store_backend = match var("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("file") => StoreBackend::File,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                anyhow::bail!("STORE_BACKEND must be 'file' or 'memory', got '{other}'")
            }
        };

        let links_key = non_empty(var("LINKS_KEY")).unwrap_or(defaults.links_key);
        let clicks_key = non_empty(var("CLICKS_KEY")).unwrap_or(defaults.clicks_key);
        if links_key == clicks_key {
            anyhow::bail!("LINKS_KEY and CLICKS_KEY must differ (both are '{links_key}')");
        }

        let activity_capacity = var("ACTIVITY_CAPACITY")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.activity_capacity);

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            base_url,
            store_backend,
            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            links_key,
            clicks_key,
            activity_capacity,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}
