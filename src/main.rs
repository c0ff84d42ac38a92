use std::sync::Arc;

use anyhow::Context;
use linkstash::{
    clock::SystemClock,
    config::{AppConfig, StoreBackend},
    service::Shortener,
    store::{FileStore, KvStore, MemoryStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (ignore error if file is absent, env vars may already be set)
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkstash=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    tracing::info!("Starting linkstash on {}", config.bind_addr());
    tracing::info!("Base URL: {}", config.base_url);

    // Open the key-value store
    let store: Arc<dyn KvStore> = match config.store_backend {
        StoreBackend::File => {
            let store = FileStore::open(&config.data_dir).with_context(|| {
                format!("failed to open data directory {}", config.data_dir.display())
            })?;
            tracing::info!("Using file store at {}", store.dir().display());
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; links will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Build shared state
    let shortener = Shortener::open(store, &config, Arc::new(SystemClock));
    let bind_addr = config.bind_addr();
    let state = AppState::new(config, shortener);

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, linkstash::router(state)).await?;

    Ok(())
}
