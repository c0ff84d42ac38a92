pub mod pages;
pub mod redirect;

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};

pub const FLASH_SUCCESS: &str = "flash_success";
pub const FLASH_ERROR: &str = "flash_error";

/// Set a flash cookie and redirect to the given path.
pub(crate) fn set_flash_and_redirect(
    jar: CookieJar,
    success: Option<&str>,
    error: Option<&str>,
    destination: &str,
) -> Response {
    let mut jar = jar;

    if let Some(msg) = success {
        jar = jar.add(flash_cookie(FLASH_SUCCESS, msg));
    }
    if let Some(msg) = error {
        jar = jar.add(flash_cookie(FLASH_ERROR, msg));
    }

    (jar, Redirect::to(destination)).into_response()
}

/// Read both flash messages and return the jar with them cleared.
pub(crate) fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>, Option<String>) {
    let success = jar.get(FLASH_SUCCESS).map(|c| c.value().to_owned());
    let error = jar.get(FLASH_ERROR).map(|c| c.value().to_owned());

    let jar = jar
        .remove(Cookie::build(FLASH_SUCCESS).path("/").build())
        .remove(Cookie::build(FLASH_ERROR).path("/").build());

    (jar, success, error)
}

fn flash_cookie(name: &'static str, msg: &str) -> Cookie<'static> {
    Cookie::build((name, msg.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(30))
        .build()
}
