use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use swagger_mcp_http_tools::config::{RequestSettings, SecurityConfig};

/// Configuration for a spec-backed tool source.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Spec location (http(s) URL or file path).
    pub spec: String,

    /// Optional pinned spec hash (`sha256:<hex>`).
    #[serde(default)]
    pub spec_hash: Option<String>,

    /// Hash policy: warn, fail, or ignore.
    #[serde(default)]
    pub spec_hash_policy: HashPolicy,

    /// Override the base URL derived from the spec.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Path regexes; empty means every path.
    #[serde(default)]
    pub include_paths: Vec<String>,

    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// HTTP methods, case-insensitive; empty means every method.
    #[serde(default)]
    pub include_methods: Vec<String>,

    #[serde(default)]
    pub exclude_methods: Vec<String>,

    #[serde(default)]
    pub security: SecurityConfig,

    /// Static `name=value` headers added to every request.
    #[serde(default)]
    pub headers: Vec<String>,

    /// Names of inbound request headers relayed to the API (HTTP transport only).
    #[serde(default)]
    pub forward_headers: Vec<String>,
}

impl ApiConfig {
    #[must_use]
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            ..Self::default()
        }
    }

    /// The base URL override, if set to something non-blank.
    #[must_use]
    pub fn base_url_override(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    #[must_use]
    pub fn request_settings(&self) -> RequestSettings {
        RequestSettings::new(self.security.clone(), &self.headers)
    }
}

/// Hash verification policy.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashPolicy {
    /// Log warning if hash doesn't match.
    #[default]
    Warn,
    /// Fail startup if hash doesn't match.
    Fail,
    /// Ignore hash verification.
    Ignore,
}

impl fmt::Display for HashPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HashPolicy::Warn => "warn",
            HashPolicy::Fail => "fail",
            HashPolicy::Ignore => "ignore",
        })
    }
}

impl FromStr for HashPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(HashPolicy::Warn),
            "fail" => Ok(HashPolicy::Fail),
            "ignore" => Ok(HashPolicy::Ignore),
            other => Err(format!(
                "unknown hash policy '{other}' (expected warn, fail or ignore)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swagger_mcp_http_tools::config::SecurityMode;

    #[test]
    fn api_config_deserializes_camel_case_with_defaults() {
        let cfg: ApiConfig = serde_json::from_value(json!({
            "spec": "./petstore.json",
            "baseUrl": " ",
            "excludeMethods": ["DELETE"],
            "security": {"mode": "bearer", "bearerAuth": "tok"},
            "headers": ["X-Env=prod"]
        }))
        .expect("valid config");

        assert_eq!(cfg.spec_hash_policy, HashPolicy::Warn);
        assert_eq!(cfg.base_url_override(), None);
        assert_eq!(cfg.exclude_methods, vec!["DELETE".to_string()]);
        assert_eq!(cfg.security.mode, SecurityMode::Bearer);

        let settings = cfg.request_settings();
        assert_eq!(
            settings.static_headers,
            vec![("X-Env".to_string(), "prod".to_string())]
        );
    }

    #[test]
    fn hash_policy_parses_case_insensitively() {
        assert_eq!("FAIL".parse::<HashPolicy>(), Ok(HashPolicy::Fail));
        assert_eq!(HashPolicy::Ignore.to_string(), "ignore");
        assert!("strict".parse::<HashPolicy>().is_err());
    }
}
