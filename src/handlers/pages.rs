use super::{set_flash_and_redirect, take_flash};
use crate::{
    activity::ActivityEntry,
    error::RegistryError,
    models::{CodeStats, LinkWithStats},
    registry::DEFAULT_VALIDITY_MINUTES,
    AppState,
};
use askama::Template;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

/// Path segments owned by fixed routes; a short code with one of these names
/// could never be visited.
const RESERVED_CODES: &[&str] = &["stats", "activity", "health", "links"];

// ── Template structs ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    links: Vec<LinkWithStats>,
    base_url: String,
    default_validity: i64,
    flash_success: Option<String>,
    flash_error: Option<String>,
}

#[derive(Template)]
#[template(path = "stats.html")]
struct StatsTemplate {
    stats: Vec<CodeStats>,
    total_clicks: usize,
}

#[derive(Template)]
#[template(path = "activity.html")]
struct ActivityTemplate {
    entries: Vec<ActivityEntry>,
}

// ── Form types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateLinkForm {
    url: String,
    custom_code: Option<String>,
    validity: Option<String>,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /
/// Creation form and link table.
pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, flash_success, flash_error) = take_flash(jar);
    let links = state.shortener.lock().await.links_with_stats();

    let tmpl = IndexTemplate {
        links,
        base_url: state.config.base_url.clone(),
        default_validity: DEFAULT_VALIDITY_MINUTES,
        flash_success,
        flash_error,
    };

    (jar, tmpl).into_response()
}

/// POST /links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CreateLinkForm>,
) -> Response {
    let url = form.url.trim().to_owned();
    if url.is_empty() {
        return set_flash_and_redirect(jar, None, Some("URL must not be empty."), "/");
    }

    let custom_code = form
        .custom_code
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(code) = custom_code {
        if let Err(msg) = check_custom_code(code) {
            return set_flash_and_redirect(jar, None, Some(msg), "/");
        }
    }

    let validity = match parse_validity(form.validity.as_deref()) {
        Ok(v) => v,
        Err(msg) => return set_flash_and_redirect(jar, None, Some(msg), "/"),
    };

    let result = state
        .shortener
        .lock()
        .await
        .shorten(&url, validity, custom_code);

    match result {
        Ok(link) => set_flash_and_redirect(
            jar,
            Some(&format!(
                "Link created: {}/{}",
                state.config.base_url, link.code
            )),
            None,
            "/",
        ),
        Err(e) => {
            let msg = match e {
                RegistryError::InvalidUrl(_) => {
                    "URL must be a valid http:// or https:// address.".to_owned()
                }
                RegistryError::CodeAlreadyExists(code) => {
                    format!("The short code {code} is already taken. Try another.")
                }
                other => {
                    tracing::error!("Failed to create link: {}", other);
                    format!("Could not create link: {other}")
                }
            };
            set_flash_and_redirect(jar, None, Some(&msg), "/")
        }
    }
}

/// GET /stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Response {
    let stats = state.shortener.lock().await.stats();
    let total_clicks = stats.iter().map(CodeStats::total).sum::<usize>();

    StatsTemplate {
        stats,
        total_clicks,
    }
    .into_response()
}

/// GET /activity
pub async fn activity(State(state): State<Arc<AppState>>) -> Response {
    let entries = state.shortener.lock().await.activity();
    ActivityTemplate { entries }.into_response()
}

// ── Private helpers ────────────────────────────────────────────────────────

/// Custom codes end up as a path segment, so keep them to URL-safe characters.
fn check_custom_code(code: &str) -> Result<(), &'static str> {
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Custom code may only contain letters, numbers, hyphens and underscores.");
    }
    if RESERVED_CODES.contains(&code) {
        return Err("That short code is reserved. Try another.");
    }
    Ok(())
}

/// Blank means "use the default"; anything else must be a non-negative
/// whole number of minutes.
fn parse_validity(raw: Option<&str>) -> Result<Option<i64>, &'static str> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => match s.parse::<i64>() {
            Ok(m) if m >= 0 => Ok(Some(m)),
            Ok(_) => Err("Validity must not be negative."),
            Err(_) => Err("Validity must be a whole number of minutes."),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_codes_must_be_path_safe() {
        assert!(check_custom_code("my-Link_01").is_ok());
        assert!(check_custom_code("a/b").is_err());
        assert!(check_custom_code("spa ce").is_err());
        assert!(check_custom_code("ünï").is_err());
        assert!(check_custom_code("stats").is_err());
    }

    #[test]
    fn validity_parsing() {
        assert_eq!(parse_validity(None), Ok(None));
        assert_eq!(parse_validity(Some("  ")), Ok(None));
        assert_eq!(parse_validity(Some("0")), Ok(Some(0)));
        assert_eq!(parse_validity(Some(" 45 ")), Ok(Some(45)));
        assert!(parse_validity(Some("-1")).is_err());
        assert!(parse_validity(Some("ten")).is_err());
    }
}
