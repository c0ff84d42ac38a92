//! Self-hosted URL shortener: a link registry and click ledger persisted to a
//! key-value store, served as a small HTML application.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub mod activity;
pub mod clock;
pub mod codegen;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod service;
pub mod store;

use config::AppConfig;
use service::Shortener;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: AppConfig,
    /// Every read and mutation goes through this lock, so operations never
    /// interleave within the process.
    pub shortener: Mutex<Shortener>,
}

impl AppState {
    pub fn new(config: AppConfig, shortener: Shortener) -> Arc<Self> {
        Arc::new(Self {
            config,
            shortener: Mutex::new(shortener),
        })
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/links", post(handlers::pages::create_link))
        .route("/stats", get(handlers::pages::stats))
        .route("/activity", get(handlers::pages::activity))
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        // Short-link redirect must come LAST so the fixed routes take priority
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
