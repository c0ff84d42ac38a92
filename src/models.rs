use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened link as stored under the `links` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub code: String,
    pub url: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch. Resolution fails strictly after this.
    pub expires_at: i64,
}

impl LinkRecord {
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis > self.expires_at
    }
}

/// A single visit, appended under the `clicks` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRecord {
    pub ts: i64,
    #[serde(rename = "ref")]
    pub referrer: String,
}

impl ClickRecord {
    pub fn ts_display(&self) -> String {
        format_millis(self.ts)
    }
}

/// A link joined with its click count, used on the index page.
#[derive(Debug, Clone)]
pub struct LinkWithStats {
    pub code: String,
    pub url: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub click_count: usize,
    pub expired: bool,
}

impl LinkWithStats {
    pub fn expires_display(&self) -> String {
        format_millis(self.expires_at)
    }
}

/// Click history for one code, used on the stats page.
#[derive(Debug, Clone)]
pub struct CodeStats {
    pub code: String,
    pub clicks: Vec<ClickRecord>,
}

impl CodeStats {
    pub fn total(&self) -> usize {
        self.clicks.len()
    }
}

/// Render epoch milliseconds as a UTC timestamp for display.
pub fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_record_uses_camel_case_keys() {
        let link = LinkRecord {
            code: "abc123".into(),
            url: "https://example.com".into(),
            created_at: 1,
            expires_at: 60_001,
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["createdAt"], 1);
        assert_eq!(json["expiresAt"], 60_001);
    }

    #[test]
    fn click_record_serializes_ref() {
        let click = ClickRecord {
            ts: 5,
            referrer: "direct".into(),
        };
        assert_eq!(
            serde_json::to_string(&click).unwrap(),
            r#"{"ts":5,"ref":"direct"}"#
        );
    }

    #[test]
    fn expiry_is_inclusive_of_the_boundary() {
        let link = LinkRecord {
            code: "abc123".into(),
            url: "https://example.com".into(),
            created_at: 0,
            expires_at: 100,
        };
        assert!(!link.is_expired_at(100));
        assert!(link.is_expired_at(101));
    }

    #[test]
    fn formats_epoch_millis() {
        assert_eq!(format_millis(0), "1970-01-01 00:00:00 UTC");
    }
}
