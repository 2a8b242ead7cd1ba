//! Error types for `swagger-mcp-openapi-tools`.

use swagger_mcp_http_tools::runtime::HttpToolsError;
use thiserror::Error;

/// Load-time errors. Invocation failures never surface here; they become `[Error]` tool results.
#[derive(Error, Debug)]
pub enum OpenApiToolsError {
    /// Configuration errors (invalid config, missing fields, conflicts).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("invalid spec URL '{url}': {message}")]
    InvalidSpecUrl { url: String, message: String },

    #[error("failed to fetch spec from '{url}': {message}")]
    SpecFetch { url: String, message: String },

    #[error("failed to read spec body from '{url}': {message}")]
    SpecReadBody { url: String, message: String },

    #[error("failed to read spec file '{path}': {source}")]
    SpecReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse spec from '{location}': {source}")]
    SpecParse {
        location: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("spec hash mismatch for '{location}': expected {expected}, got {actual}")]
    SpecHashMismatch {
        location: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Http(#[from] HttpToolsError),
}

/// Result type alias for spec tooling operations.
pub type Result<T> = std::result::Result<T, OpenApiToolsError>;
