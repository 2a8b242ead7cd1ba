//! Spec loading: fetch or read the document, verify its pinned hash, parse it.

use crate::config::{ApiConfig, HashPolicy};
use crate::error::{OpenApiToolsError, Result};
use crate::model::SpecDocument;
use reqwest::Client;
use sha2::{Digest, Sha256};
use swagger_mcp_http_tools::safety::{redact_url_str, sanitize_reqwest_error};
use url::Url;

#[must_use]
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Load, verify and parse the spec named by `config.spec`.
///
/// # Errors
///
/// Returns an error if the spec cannot be fetched, read or parsed, or if its hash does not match
/// under [`HashPolicy::Fail`].
pub async fn load_spec(client: &Client, config: &ApiConfig) -> Result<SpecDocument> {
    let content = read_spec_text(client, &config.spec).await?;
    verify_spec_hash(
        &config.spec,
        &content,
        config.spec_hash.as_deref(),
        config.spec_hash_policy,
    )?;
    parse_spec(&config.spec, &content)
}

/// Read the raw spec text from an http(s) URL or a file path.
///
/// # Errors
///
/// Returns an error on an invalid URL, a transport failure, a non-success status, or an
/// unreadable file.
pub async fn read_spec_text(client: &Client, location: &str) -> Result<String> {
    if !is_url(location) {
        tracing::info!(path = %location, "loading spec from file");
        return std::fs::read_to_string(location).map_err(|e| OpenApiToolsError::SpecReadFile {
            path: location.to_string(),
            source: e,
        });
    }

    let shown = redact_url_str(location);
    tracing::info!(url = %shown, "fetching spec");
    let url = Url::parse(location).map_err(|e| OpenApiToolsError::InvalidSpecUrl {
        url: shown.clone(),
        message: e.to_string(),
    })?;

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| OpenApiToolsError::SpecFetch {
            url: shown.clone(),
            message: sanitize_reqwest_error(&e),
        })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(OpenApiToolsError::SpecFetch {
            url: shown,
            message: format!("server responded with status {status}"),
        });
    }

    resp.text()
        .await
        .map_err(|e| OpenApiToolsError::SpecReadBody {
            url: shown,
            message: sanitize_reqwest_error(&e),
        })
}

/// `sha256:<hex>` digest of the spec text.
#[must_use]
pub fn spec_hash(content: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(content.as_bytes())))
}

/// Compare the spec text against a pinned hash.
///
/// # Errors
///
/// Returns [`OpenApiToolsError::SpecHashMismatch`] only under [`HashPolicy::Fail`].
pub fn verify_spec_hash(
    location: &str,
    content: &str,
    expected: Option<&str>,
    policy: HashPolicy,
) -> Result<()> {
    let Some(expected) = expected.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    if policy == HashPolicy::Ignore {
        return Ok(());
    }

    let actual = spec_hash(content);
    if actual == expected {
        return Ok(());
    }

    let location = if is_url(location) {
        redact_url_str(location)
    } else {
        location.to_string()
    };
    match policy {
        HashPolicy::Fail => Err(OpenApiToolsError::SpecHashMismatch {
            location,
            expected: expected.to_string(),
            actual,
        }),
        HashPolicy::Warn => {
            tracing::warn!(
                spec = %location,
                expected = %expected,
                actual = %actual,
                "spec hash mismatch"
            );
            Ok(())
        }
        HashPolicy::Ignore => Ok(()),
    }
}

/// Parse spec text. JSON is a subset of YAML, so one parser covers both.
///
/// # Errors
///
/// Returns [`OpenApiToolsError::SpecParse`] if the text is not a readable document.
pub fn parse_spec(location: &str, content: &str) -> Result<SpecDocument> {
    serde_yaml::from_str(content).map_err(|e| OpenApiToolsError::SpecParse {
        location: location.to_string(),
        source: e,
    })
}

/// Resolve a relative server URL against the URL the spec was fetched from.
///
/// Absolute http(s) base URLs, and any base URL of a spec loaded from disk, are returned as-is.
///
/// # Errors
///
/// Returns an error if the spec URL or the joined URL is invalid.
pub fn resolve_base_url(spec_location: &str, base_url: &str) -> Result<String> {
    if is_url(base_url) || !is_url(spec_location) {
        return Ok(base_url.to_string());
    }

    let mut spec_url =
        Url::parse(spec_location).map_err(|e| OpenApiToolsError::InvalidSpecUrl {
            url: redact_url_str(spec_location),
            message: e.to_string(),
        })?;
    spec_url.set_fragment(None);
    spec_url.set_query(None);

    let resolved = spec_url.join(base_url).map_err(|e| {
        OpenApiToolsError::Config(format!("invalid base URL '{base_url}': {e} (set --base-url)"))
    })?;
    Ok(resolved.to_string())
}
