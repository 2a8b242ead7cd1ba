//! Authentication injection for outbound requests.
//!
//! Injection never fails: credentials that cannot be expressed as a header or query pair are
//! skipped and logged at debug level.

use crate::config::{SecurityConfig, SecurityMode};
use base64::Engine as _;
use reqwest::header::{AUTHORIZATION, COOKIE, HeaderName, HeaderValue};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

/// One `location:name=value` API key entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyEntry {
    pub location: ApiKeyLocation,
    pub name: String,
    pub value: String,
}

/// Parse comma-separated `location:name=value` entries.
///
/// An entry is skipped when it lacks `:` or `=`, when `=` comes before `:` plus two characters
/// (no room for a name), or when its location is not `header`, `query` or `cookie`.
#[must_use]
pub fn parse_api_key_entries(raw: &str) -> Vec<ApiKeyEntry> {
    let mut entries = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (Some(colon), Some(eq)) = (part.find(':'), part.find('=')) else {
            tracing::debug!("skipping malformed apiKey entry");
            continue;
        };
        if eq < colon + 2 {
            tracing::debug!("skipping malformed apiKey entry");
            continue;
        }
        let location = match part[..colon].trim().to_ascii_lowercase().as_str() {
            "header" => ApiKeyLocation::Header,
            "query" => ApiKeyLocation::Query,
            "cookie" => ApiKeyLocation::Cookie,
            other => {
                tracing::debug!(location = %other, "ignoring apiKey entry with unknown location");
                continue;
            }
        };
        entries.push(ApiKeyEntry {
            location,
            name: part[colon + 1..eq].trim().to_string(),
            value: part[eq + 1..].trim().to_string(),
        });
    }
    entries
}

/// Apply the configured security mode to `request`.
pub fn apply_security(request: &mut reqwest::Request, security: &SecurityConfig) {
    match security.mode {
        SecurityMode::None => {}
        SecurityMode::Basic => {
            if security.basic_auth.is_empty() {
                return;
            }
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(security.basic_auth.as_bytes());
            set_authorization(request, &format!("Basic {encoded}"));
        }
        SecurityMode::Bearer => {
            if security.bearer_auth.is_empty() {
                return;
            }
            set_authorization(request, &format!("Bearer {}", security.bearer_auth));
        }
        SecurityMode::ApiKey => {
            for entry in parse_api_key_entries(&security.api_key_auth) {
                apply_api_key(request, &entry);
            }
        }
    }
}

fn apply_api_key(request: &mut reqwest::Request, entry: &ApiKeyEntry) {
    match entry.location {
        ApiKeyLocation::Header => {
            if let Some((name, value)) = header_pair(&entry.name, &entry.value) {
                request.headers_mut().insert(name, value);
            }
        }
        ApiKeyLocation::Query => set_query_param(request.url_mut(), &entry.name, &entry.value),
        ApiKeyLocation::Cookie => {
            let cookie = format!("{}={}", entry.name, entry.value);
            let merged = match request
                .headers()
                .get(COOKIE)
                .and_then(|v| v.to_str().ok())
            {
                Some(existing) if !existing.is_empty() => format!("{existing}; {cookie}"),
                _ => cookie,
            };
            if let Ok(value) = HeaderValue::from_str(&merged) {
                request.headers_mut().insert(COOKIE, value);
            } else {
                tracing::debug!(cookie = %entry.name, "skipping cookie with invalid characters");
            }
        }
    }
}

fn set_authorization(request: &mut reqwest::Request, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(mut v) => {
            v.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, v);
        }
        Err(_) => tracing::debug!("skipping Authorization header with invalid characters"),
    }
}

/// Validate a header name/value pair; `None` when either is not valid header text.
pub(crate) fn header_pair(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
        tracing::debug!(header = %name, "skipping invalid header name");
        return None;
    };
    let Ok(value) = HeaderValue::from_str(value) else {
        tracing::debug!(header = %name, "skipping invalid header value");
        return None;
    };
    Some((name, value))
}

/// Set `name=value` in the query string, replacing any existing values for `name`.
pub(crate) fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (k, v) in url.query_pairs() {
        if k == name {
            if !replaced {
                pairs.push((name.to_string(), value.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((k.into_owned(), v.into_owned()));
        }
    }
    if !replaced {
        pairs.push((name.to_string(), value.to_string()));
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn request(url: &str) -> reqwest::Request {
        reqwest::Request::new(Method::GET, Url::parse(url).expect("valid url"))
    }

    fn security(mode: SecurityMode) -> SecurityConfig {
        SecurityConfig {
            mode,
            basic_auth: "user:pass".to_string(),
            api_key_auth: String::new(),
            bearer_auth: "tok".to_string(),
        }
    }

    #[test]
    fn parse_api_key_entries_skips_malformed_and_unknown() {
        let entries = parse_api_key_entries(
            "header:X-Key=abc, query:token=a=b, cookie:sid=ccc, nocolon=1, q:=x, body:k=v,,",
        );
        assert_eq!(
            entries,
            vec![
                ApiKeyEntry {
                    location: ApiKeyLocation::Header,
                    name: "X-Key".to_string(),
                    value: "abc".to_string(),
                },
                ApiKeyEntry {
                    location: ApiKeyLocation::Query,
                    name: "token".to_string(),
                    value: "a=b".to_string(),
                },
                ApiKeyEntry {
                    location: ApiKeyLocation::Cookie,
                    name: "sid".to_string(),
                    value: "ccc".to_string(),
                },
            ]
        );
    }

    #[test]
    fn basic_auth_sets_encoded_authorization() {
        let mut req = request("http://x/pets");
        apply_security(&mut req, &security(SecurityMode::Basic));
        assert_eq!(
            req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Basic dXNlcjpwYXNz")
        );
    }

    #[test]
    fn bearer_auth_sets_token_and_skips_when_empty() {
        let mut req = request("http://x/pets");
        apply_security(&mut req, &security(SecurityMode::Bearer));
        assert_eq!(
            req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer tok")
        );

        let mut cfg = security(SecurityMode::Bearer);
        cfg.bearer_auth.clear();
        let mut req = request("http://x/pets");
        apply_security(&mut req, &cfg);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn api_key_query_entry_overwrites_existing_value() {
        let mut cfg = security(SecurityMode::ApiKey);
        cfg.api_key_auth = "query:token=abc123".to_string();

        let mut req = request("http://x/pets?token=old&limit=5");
        apply_security(&mut req, &cfg);

        let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("token".to_string(), "abc123".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn api_key_header_and_cookie_entries() {
        let mut cfg = security(SecurityMode::ApiKey);
        cfg.api_key_auth = "header:X-Api-Key=k1,cookie:sid=s1,cookie:theme=dark".to_string();

        let mut req = request("http://x/pets");
        apply_security(&mut req, &cfg);

        assert_eq!(
            req.headers().get("x-api-key").and_then(|v| v.to_str().ok()),
            Some("k1")
        );
        assert_eq!(
            req.headers().get(COOKIE).and_then(|v| v.to_str().ok()),
            Some("sid=s1; theme=dark")
        );
    }

    #[test]
    fn none_mode_leaves_request_untouched() {
        let mut cfg = security(SecurityMode::None);
        cfg.api_key_auth = "header:X-Api-Key=k1".to_string();
        let mut req = request("http://x/pets");
        apply_security(&mut req, &cfg);
        assert!(req.headers().is_empty());
        assert_eq!(req.url().query(), None);
    }
}
