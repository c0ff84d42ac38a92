use crate::{clock::Clock, models::ClickRecord};
use std::{collections::BTreeMap, sync::Arc};

/// Referrer recorded when the visit carried none.
pub const DIRECT: &str = "direct";

/// Append-only visit history per short code.
///
/// The ledger does not know about the registry: callers check that a link
/// resolves before recording a click for it.
pub struct ClickLedger {
    clicks: BTreeMap<String, Vec<ClickRecord>>,
    clock: Arc<dyn Clock>,
}

impl ClickLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::from_clicks(BTreeMap::new(), clock)
    }

    /// Rebuild a ledger from a previously persisted map.
    pub fn from_clicks(clicks: BTreeMap<String, Vec<ClickRecord>>, clock: Arc<dyn Clock>) -> Self {
        Self { clicks, clock }
    }

    /// Append a visit for `code` and return it.
    pub fn record(&mut self, code: &str, referrer: Option<&str>) -> ClickRecord {
        let click = ClickRecord {
            ts: self.clock.now_millis(),
            referrer: referrer
                .filter(|r| !r.is_empty())
                .unwrap_or(DIRECT)
                .to_owned(),
        };
        self.clicks
            .entry(code.to_owned())
            .or_default()
            .push(click.clone());
        click
    }

    pub fn count_for(&self, code: &str) -> usize {
        self.clicks.get(code).map_or(0, Vec::len)
    }

    pub fn history(&self, code: &str) -> &[ClickRecord] {
        self.clicks.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every code with its history, ordered by code.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[ClickRecord])> {
        self.clicks.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total clicks across all codes.
    pub fn total(&self) -> usize {
        self.clicks.values().map(Vec::len).sum()
    }

    /// Borrow the underlying map for persistence.
    pub fn clicks(&self) -> &BTreeMap<String, Vec<ClickRecord>> {
        &self.clicks
    }
}
