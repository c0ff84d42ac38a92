use crate::models::format_millis;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;

/// One user-facing event: what happened, when, and the data involved.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub ts: i64,
    pub msg: String,
    pub payload: Value,
}

impl ActivityEntry {
    pub fn ts_display(&self) -> String {
        format_millis(self.ts)
    }

    pub fn payload_display(&self) -> String {
        self.payload.to_string()
    }
}

/// Bounded in-memory event log. The oldest entries are dropped once
/// `capacity` is reached.
#[derive(Debug)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn log(&mut self, ts: i64, msg: impl Into<String>, payload: Value) {
        let msg = msg.into();
        tracing::info!(%payload, "{}", msg);

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry { ts, msg, payload });
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
