use thiserror::Error;

/// Failures reported by the link registry and code generator.
///
/// Every variant is a local, recoverable condition; the caller decides what
/// the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("short code '{0}' already exists")]
    CodeAlreadyExists(String),

    #[error("short code '{0}' not found")]
    NotFound(String),

    #[error("short code '{0}' has expired")]
    Expired(String),

    #[error("no free short code found after {0} attempts")]
    GenerationExhausted(usize),
}

/// Failures of the persistent key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
