//! Error types for the `swagger-mcp` binary.

use swagger_mcp_openapi_tools::error::OpenApiToolsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Spec loading and tool derivation
    #[error(transparent)]
    Tools(#[from] OpenApiToolsError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// MCP transport failures (handshake, session task)
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
