use crate::{
    activity::{ActivityEntry, ActivityLog},
    clock::Clock,
    config::AppConfig,
    error::RegistryError,
    ledger::ClickLedger,
    models::{ClickRecord, CodeStats, LinkRecord, LinkWithStats},
    registry::{self, LinkRegistry},
    store::{self, KvStore},
};
use serde_json::json;
use std::sync::Arc;

/// Outcome of a successful visit: where to send the user and what was recorded.
#[derive(Debug, Clone)]
pub struct Visit {
    pub link: LinkRecord,
    /// Normalized target, safe to put in a `Location` header.
    pub location: String,
    pub click: ClickRecord,
}

/// Owns the registry, ledger and activity log for one process and keeps the
/// store in sync after every mutation.
///
/// The in-memory maps are the source of truth. A failed write is logged and
/// retried implicitly by the next successful mutation, which rewrites the
/// whole map.
pub struct Shortener {
    registry: LinkRegistry,
    ledger: ClickLedger,
    activity: ActivityLog,
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    links_key: String,
    clicks_key: String,
}

impl Shortener {
    /// Load persisted links and clicks from `store`.
    pub fn open(store: Arc<dyn KvStore>, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let links = store::load_or_default(store.as_ref(), &config.links_key);
        let clicks = store::load_or_default(store.as_ref(), &config.clicks_key);

        let registry = LinkRegistry::from_links(links, clock.clone());
        let ledger = ClickLedger::from_clicks(clicks, clock.clone());
        tracing::info!(
            "Loaded {} link(s) and {} click(s)",
            registry.len(),
            ledger.total()
        );

        Self {
            registry,
            ledger,
            activity: ActivityLog::new(config.activity_capacity),
            store,
            clock,
            links_key: config.links_key.clone(),
            clicks_key: config.clicks_key.clone(),
        }
    }

    /// Create a short link and persist the registry.
    pub fn shorten(
        &mut self,
        url: &str,
        validity_minutes: Option<i64>,
        custom_code: Option<&str>,
    ) -> Result<LinkRecord, RegistryError> {
        match self.registry.create(url, validity_minutes, custom_code) {
            Ok(link) => {
                self.persist_links();
                self.log("Created short link", json!(link));
                Ok(link)
            }
            Err(e) => {
                let (msg, payload) = match &e {
                    RegistryError::InvalidUrl(url) => ("Invalid URL", json!({ "url": url })),
                    RegistryError::CodeAlreadyExists(code) => {
                        ("Code already exists", json!({ "code": code }))
                    }
                    RegistryError::GenerationExhausted(attempts) => {
                        ("Code generation exhausted", json!({ "attempts": attempts }))
                    }
                    other => ("Create failed", json!({ "error": other.to_string() })),
                };
                self.log(msg, payload);
                Err(e)
            }
        }
    }

    /// Resolve `code` and, if it is live, record a click and persist the ledger.
    ///
    /// Missing or expired codes, and stored targets that no longer parse,
    /// leave the ledger untouched.
    pub fn visit(&mut self, code: &str, referrer: Option<&str>) -> Result<Visit, RegistryError> {
        let link = match self.registry.resolve(code) {
            Ok(link) => link,
            Err(e) => {
                let msg = match e {
                    RegistryError::Expired(_) => "Link expired",
                    _ => "Invalid redirect code",
                };
                self.log(msg, json!({ "code": code }));
                return Err(e);
            }
        };

        let Some(location) = registry::redirect_location(&link.url) else {
            self.log("Invalid redirect target", json!({ "code": code, "url": link.url }));
            return Err(RegistryError::InvalidUrl(link.url));
        };

        let click = self.ledger.record(code, referrer);
        self.persist_clicks();
        self.log("Redirect", json!({ "code": code, "click": click }));

        Ok(Visit {
            link,
            location,
            click,
        })
    }

    /// Every link with its click count, newest first.
    pub fn links_with_stats(&self) -> Vec<LinkWithStats> {
        let now = self.clock.now_millis();
        self.registry
            .list()
            .into_iter()
            .rev()
            .map(|link| LinkWithStats {
                click_count: self.ledger.count_for(&link.code),
                expired: link.is_expired_at(now),
                code: link.code,
                url: link.url,
                created_at: link.created_at,
                expires_at: link.expires_at,
            })
            .collect()
    }

    /// Click history for every code that has been visited.
    pub fn stats(&self) -> Vec<CodeStats> {
        self.ledger
            .entries()
            .map(|(code, clicks)| CodeStats {
                code: code.to_owned(),
                clicks: clicks.to_vec(),
            })
            .collect()
    }

    /// Recent activity, newest first.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        let mut entries: Vec<ActivityEntry> = self.activity.entries().cloned().collect();
        entries.reverse();
        entries
    }

    pub fn registry(&self) -> &LinkRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &ClickLedger {
        &self.ledger
    }

    fn log(&mut self, msg: &str, payload: serde_json::Value) {
        let now = self.clock.now_millis();
        self.activity.log(now, msg, payload);
    }

    fn persist_links(&self) {
        if let Err(e) = store::save(self.store.as_ref(), &self.links_key, self.registry.links()) {
            tracing::error!("Failed to persist links: {}", e);
        }
    }

    fn persist_clicks(&self) {
        if let Err(e) = store::save(self.store.as_ref(), &self.clicks_key, self.ledger.clicks()) {
            tracing::error!("Failed to persist clicks: {}", e);
        }
    }
}
