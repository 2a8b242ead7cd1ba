//! Outbound request settings shared by every tool of a source.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authentication mode applied to every outbound request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum SecurityMode {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "bearer")]
    Bearer,
    #[serde(rename = "apiKey", alias = "apikey")]
    ApiKey,
}

impl SecurityMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityMode::None => "none",
            SecurityMode::Basic => "basic",
            SecurityMode::Bearer => "bearer",
            SecurityMode::ApiKey => "apiKey",
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(SecurityMode::None),
            "basic" => Ok(SecurityMode::Basic),
            "bearer" => Ok(SecurityMode::Bearer),
            "apiKey" | "apikey" => Ok(SecurityMode::ApiKey),
            other => Err(format!(
                "unknown security mode '{other}' (expected none, basic, bearer or apiKey)"
            )),
        }
    }
}

/// Security mode plus the credential material for each mode.
///
/// Only the credentials matching `mode` are ever read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    #[serde(default)]
    pub mode: SecurityMode,

    /// `user:password`, base64-encoded as-is into the `Authorization` header.
    #[serde(default)]
    pub basic_auth: String,

    /// Comma-separated `location:name=value` entries, e.g. `header:X-Key=abc,query:token=xyz`.
    #[serde(default)]
    pub api_key_auth: String,

    #[serde(default)]
    pub bearer_auth: String,
}

/// Settings applied to every request after tool arguments have been materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSettings {
    pub security: SecurityConfig,
    /// Static headers appended to every request.
    pub static_headers: Vec<(String, String)>,
}

impl RequestSettings {
    /// Build settings from raw `name=value` header pairs; malformed pairs are dropped.
    #[must_use]
    pub fn new<S: AsRef<str>>(security: SecurityConfig, header_pairs: &[S]) -> Self {
        Self {
            security,
            static_headers: parse_header_pairs(header_pairs),
        }
    }
}

/// Parse `name=value` pairs. Each entry may itself hold several comma-separated pairs.
///
/// Entries without `=` or with an empty name are skipped.
#[must_use]
pub fn parse_header_pairs<S: AsRef<str>>(entries: &[S]) -> Vec<(String, String)> {
    entries
        .iter()
        .flat_map(|e| e.as_ref().split(','))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                tracing::debug!(pair = %pair.trim(), "skipping header pair without a name");
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}
