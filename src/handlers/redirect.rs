use super::set_flash_and_redirect;
use crate::{error::RegistryError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

/// GET /:code
///
/// 1. Resolve the code; missing or expired links and unparseable targets
///    never reach the redirect.
/// 2. Record the click with the request's referrer (or "direct").
/// 3. Redirect to the original URL.
///
/// Refused visits go back to the index page with an error flash.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let outcome = state
        .shortener
        .lock()
        .await
        .visit(&code, referer.as_deref());

    match outcome {
        Ok(visit) => Redirect::to(&visit.location).into_response(),
        Err(RegistryError::Expired(_)) => set_flash_and_redirect(
            jar,
            None,
            Some(&format!("Short link {code} has expired.")),
            "/",
        ),
        Err(RegistryError::InvalidUrl(url)) => {
            tracing::warn!("Stored target for '{}' is not a valid URL: {:?}", code, url);
            set_flash_and_redirect(
                jar,
                None,
                Some(&format!("Short link {code} points to an invalid URL.")),
                "/",
            )
        }
        Err(e) => {
            tracing::debug!("Refusing redirect for '{}': {}", code, e);
            set_flash_and_redirect(
                jar,
                None,
                Some(&format!("Short link {code} not found.")),
                "/",
            )
        }
    }
}
