//! HTTP tool descriptors and the runtime that turns a tool call into an outbound request.
//!
//! This crate knows nothing about API description documents; descriptors are produced by
//! `swagger-mcp-openapi-tools` and hosted by `swagger-mcp-server`.

pub mod config;
pub mod descriptor;
pub mod runtime;
pub mod safety;
pub mod security;
pub mod semantics;
