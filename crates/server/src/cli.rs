//! Command line and environment configuration.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use swagger_mcp_http_tools::config::{SecurityConfig, SecurityMode};
use swagger_mcp_openapi_tools::config::{ApiConfig, HashPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "swagger-mcp",
    version,
    about = "Expose a Swagger 2.0 / OpenAPI 3.0 API as MCP tools"
)]
pub struct Cli {
    /// Spec location: an http(s) URL or a file path (JSON or YAML).
    #[arg(long, env = "SWAGGER_MCP_SPEC")]
    pub spec: String,

    /// Pinned spec hash, `sha256:<hex>`.
    #[arg(long, env = "SWAGGER_MCP_SPEC_HASH")]
    pub spec_hash: Option<String>,

    #[arg(long, env = "SWAGGER_MCP_SPEC_HASH_POLICY", default_value_t = HashPolicy::Warn)]
    pub spec_hash_policy: HashPolicy,

    /// Use this base URL instead of the one derived from the spec.
    #[arg(long, env = "SWAGGER_MCP_BASE_URL")]
    pub base_url: Option<String>,

    /// Path regexes to include (comma separated).
    #[arg(long, env = "SWAGGER_MCP_INCLUDE_PATHS", value_delimiter = ',')]
    pub include_paths: Vec<String>,

    #[arg(long, env = "SWAGGER_MCP_EXCLUDE_PATHS", value_delimiter = ',')]
    pub exclude_paths: Vec<String>,

    /// HTTP methods to include (comma separated, case-insensitive).
    #[arg(long, env = "SWAGGER_MCP_INCLUDE_METHODS", value_delimiter = ',')]
    pub include_methods: Vec<String>,

    #[arg(long, env = "SWAGGER_MCP_EXCLUDE_METHODS", value_delimiter = ',')]
    pub exclude_methods: Vec<String>,

    /// Outbound authentication: none, basic, bearer or apiKey.
    #[arg(long, env = "SWAGGER_MCP_SECURITY", default_value_t = SecurityMode::None)]
    pub security: SecurityMode,

    /// `user:password` for basic auth.
    #[arg(long, env = "SWAGGER_MCP_BASIC_AUTH", default_value = "", hide_env_values = true)]
    pub basic_auth: String,

    /// `location:name=value` entries for apiKey auth, e.g. `header:X-Key=abc,query:token=xyz`.
    #[arg(long, env = "SWAGGER_MCP_API_KEY_AUTH", default_value = "", hide_env_values = true)]
    pub api_key_auth: String,

    #[arg(long, env = "SWAGGER_MCP_BEARER_AUTH", default_value = "", hide_env_values = true)]
    pub bearer_auth: String,

    /// Static `name=value` headers added to every request (comma separated).
    #[arg(long, env = "SWAGGER_MCP_HEADERS", value_delimiter = ',')]
    pub headers: Vec<String>,

    /// Inbound header names relayed to the API (HTTP transport only).
    #[arg(long, env = "SWAGGER_MCP_FORWARD_HEADERS", value_delimiter = ',')]
    pub forward_headers: Vec<String>,

    #[arg(long, env = "SWAGGER_MCP_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "SWAGGER_MCP_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Log filter, overridden by `RUST_LOG`.
    #[arg(long, env = "SWAGGER_MCP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "SWAGGER_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            spec: self.spec.clone(),
            spec_hash: self.spec_hash.clone(),
            spec_hash_policy: self.spec_hash_policy,
            base_url: self.base_url.clone(),
            include_paths: self.include_paths.clone(),
            exclude_paths: self.exclude_paths.clone(),
            include_methods: self.include_methods.clone(),
            exclude_methods: self.exclude_methods.clone(),
            security: SecurityConfig {
                mode: self.security,
                basic_auth: self.basic_auth.clone(),
                api_key_auth: self.api_key_auth.clone(),
                bearer_auth: self.bearer_auth.clone(),
            },
            headers: self.headers.clone(),
            forward_headers: self
                .forward_headers
                .iter()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// The credential flag the selected security mode reads, when it is empty.
    #[must_use]
    pub fn missing_credentials(&self) -> Option<&'static str> {
        let (flag, value) = match self.security {
            SecurityMode::None => return None,
            SecurityMode::Basic => ("--basic-auth", &self.basic_auth),
            SecurityMode::Bearer => ("--bearer-auth", &self.bearer_auth),
            SecurityMode::ApiKey => ("--api-key-auth", &self.api_key_auth),
        };
        value.trim().is_empty().then_some(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["swagger-mcp"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse")
    }

    #[test]
    fn defaults_select_stdio_without_security() {
        let cli = parse(&["--spec", "./petstore.json"]);
        assert_eq!(cli.transport, Transport::Stdio);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.bind.to_string(), "127.0.0.1:8080");

        let config = cli.api_config();
        assert_eq!(config.spec, "./petstore.json");
        assert_eq!(config.security.mode, SecurityMode::None);
        assert_eq!(config.spec_hash_policy, HashPolicy::Warn);
        assert!(config.include_paths.is_empty());
        assert!(cli.missing_credentials().is_none());
    }

    #[test]
    fn comma_lists_and_modes_map_onto_api_config() {
        let cli = parse(&[
            "--spec",
            "https://api.example.com/openapi.yaml",
            "--include-paths",
            "^/pets,^/store",
            "--exclude-methods",
            "delete",
            "--security",
            "apiKey",
            "--api-key-auth",
            "query:token=abc123",
            "--headers",
            "X-A=1,X-B=2",
            "--forward-headers",
            "X-Tenant, ,Authorization",
            "--spec-hash-policy",
            "fail",
            "--transport",
            "http",
            "--bind",
            "0.0.0.0:9000",
        ]);
        let config = cli.api_config();
        assert_eq!(config.include_paths, vec!["^/pets", "^/store"]);
        assert_eq!(config.exclude_methods, vec!["delete"]);
        assert_eq!(config.security.mode, SecurityMode::ApiKey);
        assert_eq!(config.security.api_key_auth, "query:token=abc123");
        assert_eq!(config.headers, vec!["X-A=1", "X-B=2"]);
        assert_eq!(config.forward_headers, vec!["X-Tenant", "Authorization"]);
        assert_eq!(config.spec_hash_policy, HashPolicy::Fail);
        assert_eq!(cli.transport, Transport::Http);
        assert_eq!(cli.bind.port(), 9000);
    }

    #[test]
    fn unknown_security_mode_is_rejected() {
        let err = Cli::try_parse_from(["swagger-mcp", "--spec", "x", "--security", "oauth2"])
            .expect_err("oauth2 is not a mode");
        assert!(err.to_string().contains("oauth2"));
    }

    #[test]
    fn missing_credentials_names_the_flag() {
        let cli = parse(&["--spec", "x", "--security", "bearer"]);
        assert_eq!(cli.missing_credentials(), Some("--bearer-auth"));

        let cli = parse(&["--spec", "x", "--security", "basic", "--basic-auth", "u:p"]);
        assert!(cli.missing_credentials().is_none());
    }
}
