use crate::{clock::Clock, codegen, error::RegistryError, models::LinkRecord};
use std::{collections::HashMap, sync::Arc};

/// Validity applied when none (or zero) is given.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Mapping from short code to [`LinkRecord`].
///
/// Records are inserted once and never updated or removed. Expiry is only
/// checked when a code is resolved.
pub struct LinkRegistry {
    links: HashMap<String, LinkRecord>,
    clock: Arc<dyn Clock>,
}

impl LinkRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::from_links(HashMap::new(), clock)
    }

    /// Rebuild a registry from a previously persisted map.
    pub fn from_links(links: HashMap<String, LinkRecord>, clock: Arc<dyn Clock>) -> Self {
        Self { links, clock }
    }

    /// Create a link for `url`.
    ///
    /// A non-empty `custom_code` is used verbatim; otherwise a fresh code is
    /// generated against the current keys. Nothing is inserted on error.
    pub fn create(
        &mut self,
        url: &str,
        validity_minutes: Option<i64>,
        custom_code: Option<&str>,
    ) -> Result<LinkRecord, RegistryError> {
        if !is_valid_url(url) {
            return Err(RegistryError::InvalidUrl(url.to_owned()));
        }

        let code = match custom_code.filter(|c| !c.is_empty()) {
            Some(code) => code.to_owned(),
            None => codegen::generate(|c| self.links.contains_key(c))?,
        };

        if self.links.contains_key(&code) {
            return Err(RegistryError::CodeAlreadyExists(code));
        }

        let validity = match validity_minutes {
            Some(m) if m != 0 => m,
            _ => DEFAULT_VALIDITY_MINUTES,
        };
        let now = self.clock.now_millis();
        let record = LinkRecord {
            code: code.clone(),
            url: url.to_owned(),
            created_at: now,
            expires_at: now.saturating_add(validity.saturating_mul(MILLIS_PER_MINUTE)),
        };

        self.links.insert(code, record.clone());
        Ok(record)
    }

    /// Look up `code` for redirection.
    pub fn resolve(&self, code: &str) -> Result<LinkRecord, RegistryError> {
        let record = self
            .links
            .get(code)
            .ok_or_else(|| RegistryError::NotFound(code.to_owned()))?;

        if record.is_expired_at(self.clock.now_millis()) {
            return Err(RegistryError::Expired(code.to_owned()));
        }
        Ok(record.clone())
    }

    /// Fetch a record regardless of expiry.
    pub fn get(&self, code: &str) -> Option<&LinkRecord> {
        self.links.get(code)
    }

    pub fn is_expired(&self, record: &LinkRecord) -> bool {
        record.is_expired_at(self.clock.now_millis())
    }

    /// All records, oldest first; ties broken by code.
    pub fn list(&self) -> Vec<LinkRecord> {
        let mut records: Vec<LinkRecord> = self.links.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.code.cmp(&b.code))
        });
        records
    }

    pub fn contains(&self, code: &str) -> bool {
        self.links.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Borrow the underlying map for persistence.
    pub fn links(&self) -> &HashMap<String, LinkRecord> {
        &self.links
    }
}

/// `true` when `url` parses as an absolute URL with an `http` or `https` scheme.
pub fn is_valid_url(url: &str) -> bool {
    redirect_location(url).is_some()
}

/// The serialized form of `url`, suitable for a `Location` header.
///
/// Parsing drops tabs and newlines and percent-encodes anything outside
/// ASCII, so the result is always a valid header value even when the stored
/// string is not.
pub fn redirect_location(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const T0: i64 = 1_700_000_000_000;

    fn registry() -> (LinkRegistry, ManualClock) {
        let clock = ManualClock::new(T0);
        (LinkRegistry::new(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn accepts_http_and_https_urls_verbatim() {
        let (mut reg, _) = registry();
        for url in [
            "https://example.com",
            "http://example.com/path?q=1#frag",
            "HTTPS://Example.COM/Mixed",
            "http://localhost:8080",
        ] {
            let link = reg.create(url, Some(30), None).unwrap();
            assert_eq!(link.url, url);
        }
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn rejects_non_urls_and_other_schemes() {
        let (mut reg, _) = registry();
        for url in [
            "not-a-url",
            "",
            "example.com",
            "ftp://example.com",
            "javascript:alert(1)",
            "mailto:someone@example.com",
            "http://",
        ] {
            assert_eq!(
                reg.create(url, Some(30), None),
                Err(RegistryError::InvalidUrl(url.to_owned())),
                "{url}"
            );
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn redirect_location_is_header_safe() {
        assert_eq!(
            redirect_location("https://example.com/a\nb").as_deref(),
            Some("https://example.com/ab")
        );
        assert_eq!(
            redirect_location("https://example.com/caf\u{e9}").as_deref(),
            Some("https://example.com/caf%C3%A9")
        );
        assert_eq!(redirect_location("ftp://example.com"), None);
        assert_eq!(redirect_location("not-a-url"), None);
    }

    #[test]
    fn url_with_interior_newline_is_stored_verbatim() {
        let (mut reg, _) = registry();
        let link = reg
            .create("https://example.com/a\nb", None, None)
            .unwrap();
        assert_eq!(link.url, "https://example.com/a\nb");
    }

    #[test]
    fn custom_code_is_used_and_never_overwritten() {
        let (mut reg, _) = registry();
        let link = reg
            .create("https://example.com", None, Some("mine01"))
            .unwrap();
        assert_eq!(link.code, "mine01");

        let err = reg
            .create("https://other.example", None, Some("mine01"))
            .unwrap_err();
        assert_eq!(err, RegistryError::CodeAlreadyExists("mine01".into()));
        assert_eq!(reg.get("mine01").unwrap().url, "https://example.com");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn empty_custom_code_falls_back_to_generated() {
        let (mut reg, _) = registry();
        let link = reg.create("https://example.com", None, Some("")).unwrap();
        assert_eq!(link.code.len(), codegen::CODE_LENGTH);
    }

    #[test]
    fn validity_defaults_to_thirty_minutes() {
        let (mut reg, _) = registry();
        let unset = reg.create("https://a.example", None, None).unwrap();
        let zero = reg.create("https://b.example", Some(0), None).unwrap();
        assert_eq!(unset.expires_at, T0 + 30 * 60_000);
        assert_eq!(zero.expires_at, T0 + 30 * 60_000);

        let five = reg.create("https://c.example", Some(5), None).unwrap();
        assert_eq!(five.created_at, T0);
        assert_eq!(five.expires_at, T0 + 5 * 60_000);
    }

    #[test]
    fn resolve_reports_missing_codes() {
        let (reg, _) = registry();
        assert_eq!(
            reg.resolve("nope00"),
            Err(RegistryError::NotFound("nope00".into()))
        );
    }

    #[test]
    fn resolve_is_idempotent() {
        let (mut reg, clock) = registry();
        let link = reg.create("https://example.com", Some(10), None).unwrap();
        clock.advance(1_000);
        let first = reg.resolve(&link.code).unwrap();
        let second = reg.resolve(&link.code).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, link);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let (mut reg, clock) = registry();
        let link = reg.create("https://example.com", Some(1), None).unwrap();

        clock.set(link.expires_at);
        assert!(reg.resolve(&link.code).is_ok());

        clock.set(link.expires_at + 1);
        assert_eq!(
            reg.resolve(&link.code),
            Err(RegistryError::Expired(link.code.clone()))
        );
        // Expired links stay stored.
        assert!(reg.contains(&link.code));
    }

    #[test]
    fn one_minute_link_expires_after_61_seconds() {
        let (mut reg, clock) = registry();
        let link = reg.create("https://example.com", Some(1), None).unwrap();
        assert_eq!(link.expires_at, link.created_at + 60_000);
        assert!(reg.resolve(&link.code).is_ok());

        clock.advance(61_000);
        assert!(matches!(
            reg.resolve(&link.code),
            Err(RegistryError::Expired(_))
        ));
    }

    #[test]
    fn list_is_ordered_by_creation() {
        let (mut reg, clock) = registry();
        reg.create("https://a.example", None, Some("bbbbbb")).unwrap();
        clock.advance(10);
        reg.create("https://b.example", None, Some("aaaaaa")).unwrap();

        let codes: Vec<String> = reg.list().into_iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["bbbbbb", "aaaaaa"]);
    }
}
