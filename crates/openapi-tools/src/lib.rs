//! Swagger 2.0 / OpenAPI 3.0 → MCP tool derivation.
//!
//! Loads a spec document, filters its operations, resolves request body schemas to flat field
//! lists, and derives one [`ToolDescriptor`](swagger_mcp_http_tools::descriptor::ToolDescriptor)
//! per operation. Invocation is delegated to `swagger-mcp-http-tools`.

pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod resolver;
pub mod runtime;
