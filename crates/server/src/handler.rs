//! MCP server handler backed by a [`ToolCatalog`].

use crate::catalog::ToolCatalog;
use reqwest::header::{HeaderMap, HeaderName};
use rmcp::model as m;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use std::sync::Arc;
use swagger_mcp_openapi_tools::runtime::error_result;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SwaggerMcpServer {
    catalog: Arc<ToolCatalog>,
    forward_headers: Arc<[HeaderName]>,
    instructions: Option<String>,
}

impl SwaggerMcpServer {
    /// `forward_headers` names the inbound HTTP headers relayed to the API; invalid names are
    /// logged and dropped.
    #[must_use]
    pub fn new<S: AsRef<str>>(
        catalog: ToolCatalog,
        forward_headers: &[S],
        spec_title: Option<&str>,
    ) -> Self {
        let forward_headers = forward_headers
            .iter()
            .filter_map(|h| {
                let h = h.as_ref().trim();
                match HeaderName::from_bytes(h.as_bytes()) {
                    Ok(name) => Some(name),
                    Err(e) => {
                        warn!(header = %h, error = %e, "ignoring invalid forward header name");
                        None
                    }
                }
            })
            .collect();
        Self {
            catalog: Arc::new(catalog),
            forward_headers,
            instructions: spec_title
                .map(|t| format!("Each tool calls one operation of the {t} API.")),
        }
    }

    fn forwarded(&self, ctx: &RequestContext<RoleServer>) -> Option<HeaderMap> {
        let parts = ctx.extensions.get::<axum::http::request::Parts>()?;
        forwarded_headers(&parts.headers, &self.forward_headers)
    }
}

/// Copy the configured headers out of an inbound request. Names absent from the request are
/// skipped; `None` when nothing is configured.
#[must_use]
pub fn forwarded_headers(inbound: &HeaderMap, names: &[HeaderName]) -> Option<HeaderMap> {
    if names.is_empty() {
        return None;
    }
    let mut out = HeaderMap::new();
    for name in names {
        for value in inbound.get_all(name) {
            out.append(name.clone(), value.clone());
        }
    }
    Some(out)
}

#[allow(clippy::manual_async_fn)]
impl ServerHandler for SwaggerMcpServer {
    fn get_info(&self) -> m::ServerInfo {
        m::ServerInfo {
            capabilities: m::ServerCapabilities::builder().enable_tools().build(),
            server_info: m::Implementation::from_build_env(),
            instructions: self.instructions.clone(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _req: Option<m::PaginatedRequestParams>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListToolsResult, m::ErrorData>> + Send + '_
    {
        async move { Ok(m::ListToolsResult::with_all_items(self.catalog.tools())) }
    }

    fn call_tool(
        &self,
        req: m::CallToolRequestParams,
        ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CallToolResult, m::ErrorData>> + Send + '_
    {
        async move {
            let Some(handler) = self.catalog.get(&req.name) else {
                return Ok(error_result(&format!("unknown tool '{}'", req.name)));
            };
            let forwarded = self.forwarded(&ctx);
            debug!(
                tool = %req.name,
                forwarded = forwarded.as_ref().map_or(0, HeaderMap::len),
                "calling tool"
            );
            let arguments = req.arguments.unwrap_or_default();
            Ok(handler.call(&arguments, forwarded.as_ref()).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn forwarded_headers_copies_only_configured_names() {
        let mut inbound = HeaderMap::new();
        inbound.insert("x-tenant", HeaderValue::from_static("acme"));
        inbound.insert("authorization", HeaderValue::from_static("Bearer user"));
        inbound.append("x-trace", HeaderValue::from_static("a"));
        inbound.append("x-trace", HeaderValue::from_static("b"));
        inbound.insert("cookie", HeaderValue::from_static("session=1"));

        let names = [
            HeaderName::from_static("x-tenant"),
            HeaderName::from_static("x-trace"),
            HeaderName::from_static("x-missing"),
        ];
        let out = forwarded_headers(&inbound, &names).expect("configured");
        assert_eq!(out.get("x-tenant").map(HeaderValue::as_bytes), Some(&b"acme"[..]));
        assert_eq!(out.get_all("x-trace").iter().count(), 2);
        assert!(!out.contains_key("x-missing"));
        assert!(!out.contains_key("authorization"));
        assert!(!out.contains_key("cookie"));

        assert!(forwarded_headers(&inbound, &[]).is_none());
    }

    #[test]
    fn new_drops_invalid_header_names_and_sets_instructions() {
        let server = SwaggerMcpServer::new(
            ToolCatalog::default(),
            &["X-Tenant", "bad header", " "],
            Some("Petstore"),
        );
        assert_eq!(server.forward_headers.len(), 1);
        assert_eq!(server.forward_headers[0].as_str(), "x-tenant");

        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(
            info.instructions.as_deref(),
            Some("Each tool calls one operation of the Petstore API.")
        );
    }
}
