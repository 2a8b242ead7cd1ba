//! Redaction helpers for outbound URLs.
//!
//! API-key credentials may travel in the query string and basic credentials in the userinfo,
//! so neither is allowed to reach logs or tool results.

use url::Url;

/// Drop credentials, query and fragment from a URL.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

/// Like [`redact_url`], for URLs that are still plain strings (possibly unparsable).
#[must_use]
pub fn redact_url_str(url: &str) -> String {
    match Url::parse(url) {
        Ok(u) => redact_url(&u),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    }
}

/// Render a `reqwest` error with its URL redacted.
#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
