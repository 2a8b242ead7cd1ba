//! Spec → MCP tool source runtime.
//!
//! Tool derivation runs once over the loaded document and produces one immutable
//! [`ToolDescriptor`] per retained operation. [`OpenApiToolSource`] owns those descriptors plus
//! the shared request runtime, and hands them to a [`ToolRegistry`] as [`ToolHandler`]s.

use crate::config::ApiConfig;
use crate::error::Result;
use crate::filter::OperationFilter;
use crate::loader::{load_spec, resolve_base_url};
use crate::model::{Dialect, Operation, ParameterLocation, SpecDocument};
use crate::resolver::{FieldSpec, merge_fields, resolve_fields};
use reqwest::Method;
use reqwest::header::HeaderMap;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use std::sync::Arc;
use swagger_mcp_http_tools::descriptor::{BodyField, ParamLocation, ToolDescriptor, ToolInput};
use swagger_mcp_http_tools::runtime::HttpToolRuntime;
use tracing::{debug, info, warn};

/// Tool names are cut to this many characters.
pub const MAX_TOOL_NAME_LEN: usize = 40;

/// The narrow "register tool" interface of whatever hosts the tools.
pub trait ToolRegistry {
    fn register_tool(&mut self, tool: Tool, handler: ToolHandler);
}

/// Deferred invocation logic for one tool.
#[derive(Debug, Clone)]
pub struct ToolHandler {
    descriptor: Arc<ToolDescriptor>,
    runtime: HttpToolRuntime,
}

impl ToolHandler {
    #[must_use]
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Invoke the tool. Failures come back as an `[Error] ...` result, never as an `Err`.
    pub async fn call(
        &self,
        arguments: &JsonObject,
        forwarded: Option<&HeaderMap>,
    ) -> CallToolResult {
        match self
            .runtime
            .invoke(&self.descriptor, arguments, forwarded)
            .await
        {
            Ok(body) => CallToolResult::success(vec![Content::text(
                String::from_utf8_lossy(&body).into_owned(),
            )]),
            Err(e) => {
                warn!(tool = %self.descriptor.name, error = %e, "tool call failed");
                error_result(&e.to_string())
            }
        }
    }
}

/// The result reported to the agent for any failed call.
#[must_use]
pub fn error_result(message: &str) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("[Error] {message}"))])
}

/// Tool source exposing every retained operation of one spec.
#[derive(Debug, Clone)]
pub struct OpenApiToolSource {
    tools: Vec<Arc<ToolDescriptor>>,
    runtime: HttpToolRuntime,
    base_url: String,
    title: Option<String>,
}

impl OpenApiToolSource {
    /// Derive tools from an already loaded document. Performs no network I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(spec: &SpecDocument, config: &ApiConfig) -> Result<Self> {
        let runtime = HttpToolRuntime::new(config.request_settings())?;
        Ok(Self::with_runtime(spec, config, runtime))
    }

    #[must_use]
    pub fn with_runtime(spec: &SpecDocument, config: &ApiConfig, runtime: HttpToolRuntime) -> Self {
        let tools = derive_tools(spec, config).into_iter().map(Arc::new).collect();
        let title = Some(spec.info.title.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self {
            tools,
            runtime,
            base_url: base_url(spec, config),
            title,
        }
    }

    /// Load the spec named by `config.spec` and derive its tools.
    ///
    /// A relative server URL in a spec fetched over http(s) is resolved against the spec URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec cannot be loaded or verified, or the base URL is invalid.
    pub async fn build(config: ApiConfig) -> Result<Self> {
        let runtime = HttpToolRuntime::new(config.request_settings())?;
        let spec = load_spec(runtime.client(), &config).await?;

        let mut config = config;
        if config.base_url_override().is_none() {
            let derived = base_url(&spec, &config);
            let resolved = resolve_base_url(&config.spec, &derived)?;
            if resolved != derived {
                info!(base_url = %resolved, "resolved relative server URL against spec URL");
                config.base_url = Some(resolved);
            }
        }

        Ok(Self::with_runtime(&spec, &config, runtime))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `info.title` of the spec, when it has one.
    #[must_use]
    pub fn spec_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Register every tool with `registry`, in derivation order. Returns the number registered.
    pub fn register_all<R: ToolRegistry + ?Sized>(&self, registry: &mut R) -> usize {
        for descriptor in &self.tools {
            registry.register_tool(
                descriptor.to_tool(),
                ToolHandler {
                    descriptor: Arc::clone(descriptor),
                    runtime: self.runtime.clone(),
                },
            );
        }
        self.tools.len()
    }

    /// Execute a tool call by name. When truncated names collide, the last tool wins.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: &JsonObject,
        forwarded: Option<&HeaderMap>,
    ) -> CallToolResult {
        let Some(descriptor) = self.tools.iter().rev().find(|t| t.name == name) else {
            return error_result(&format!("unknown tool '{name}'"));
        };
        ToolHandler {
            descriptor: Arc::clone(descriptor),
            runtime: self.runtime.clone(),
        }
        .call(arguments, forwarded)
        .await
    }
}

/// Base URL for every tool of `spec`.
///
/// An override wins verbatim. OpenAPI 3 uses the first server (one trailing `/` stripped) or `/`;
/// Swagger 2 uses `host`, defaulting the scheme to https, joined with `basePath`.
#[must_use]
pub fn base_url(spec: &SpecDocument, config: &ApiConfig) -> String {
    if let Some(url) = config.base_url_override() {
        return url.to_string();
    }

    match spec.dialect() {
        Dialect::OpenApi3 => spec.servers.first().map_or_else(
            || "/".to_string(),
            |s| s.url.strip_suffix('/').unwrap_or(&s.url).to_string(),
        ),
        Dialect::Swagger2 => {
            let mut base = spec.host.clone();
            if !base.starts_with("http://") && !base.starts_with("https://") {
                base = format!("https://{base}");
            }
            if !spec.base_path.is_empty() {
                base = join_url(&base, &spec.base_path);
            }
            base
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.strip_suffix('/').unwrap_or(base),
        path.strip_prefix('/').unwrap_or(path)
    )
}

/// `{method}_{path}` with `/` turned into `_` and braces removed, cut to
/// [`MAX_TOOL_NAME_LEN`] characters.
#[must_use]
pub fn tool_name(method: &str, path: &str) -> String {
    let path = path.replace('/', "_").replace(['{', '}'], "");
    format!("{method}_{path}")
        .chars()
        .take(MAX_TOOL_NAME_LEN)
        .collect()
}

/// Usage text shown to the agent.
#[must_use]
pub fn usage_text(summary: &str, description: &str) -> String {
    format!(
        "Use this tool only when the request exactly matches {summary} or {description}. \
         If you do not have any of the required parameters, always ask the user for them; \
         never fill in a parameter on your own or leave it empty. \
         If the result contains [Error], state only that error in your response and stop there. \
         Never keep records of results in memory, for example lists of users or orders."
    )
}

/// Derive one descriptor per operation that passes the configured filters.
#[must_use]
pub fn derive_tools(spec: &SpecDocument, config: &ApiConfig) -> Vec<ToolDescriptor> {
    let filter = OperationFilter::from_config(config);
    let base = base_url(spec, config);

    let tools: Vec<ToolDescriptor> = spec
        .operations()
        .iter()
        .filter(|op| filter.allows(&op.path, op.method))
        .filter_map(|op| derive_tool(spec, &base, op))
        .collect();

    info!(tools = tools.len(), base_url = %base, "derived tools from spec");
    tools
}

fn derive_tool(spec: &SpecDocument, base: &str, op: &Operation) -> Option<ToolDescriptor> {
    let method = match Method::from_bytes(op.method.to_ascii_uppercase().as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            warn!(method = %op.method, path = %op.path, error = %e, "skipping operation");
            return None;
        }
    };

    let mut inputs = Vec::new();
    let mut group = |location: ParameterLocation, tool_location: ParamLocation| -> Vec<String> {
        op.spec
            .parameters
            .iter()
            .filter(|p| p.location == location)
            .map(|p| {
                inputs.push(ToolInput {
                    name: p.name.clone(),
                    location: tool_location,
                    required: p.required,
                    description: format!("The data for {}", p.name),
                });
                p.name.clone()
            })
            .collect()
    };
    let header_params = group(ParameterLocation::Header, ParamLocation::Header);
    let query_params = group(ParameterLocation::Query, ParamLocation::Query);
    let path_params = group(ParameterLocation::Path, ParamLocation::Path);

    let fields = match spec.dialect() {
        Dialect::Swagger2 => swagger2_body_fields(spec, op),
        Dialect::OpenApi3 => openapi3_body_fields(spec, op),
    };
    for field in &fields {
        let lead = if field.from_items { "The item for" } else { "The data for" };
        inputs.push(ToolInput {
            name: field.name.clone(),
            location: ParamLocation::Body,
            required: true,
            description: format!(
                "{lead} {}, it should be in format of {}",
                field.name, field.type_tag
            ),
        });
    }
    let body_fields: Vec<BodyField> = fields
        .iter()
        .map(|f| BodyField::new(f.name.clone(), &f.type_tag))
        .collect();

    let name = tool_name(op.method, &op.path);
    let summary = Some(op.spec.summary.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    debug!(tool = %name, method = %method, path = %op.path, "derived tool");

    Some(ToolDescriptor {
        name,
        method,
        url: join_url(base, &op.path),
        path_params,
        query_params,
        header_params,
        body_fields,
        description: usage_text(&op.spec.summary, &op.spec.description),
        summary,
        inputs,
    })
}

/// Swagger 2: the `in: body` parameter's schema against `definitions`.
fn swagger2_body_fields(spec: &SpecDocument, op: &Operation) -> Vec<FieldSpec> {
    let mut fields = Vec::new();
    for p in op
        .spec
        .parameters
        .iter()
        .filter(|p| p.location == ParameterLocation::Body)
    {
        merge_fields(
            &mut fields,
            resolve_fields(p.schema.as_ref(), p.kind.as_deref(), &spec.definitions),
        );
    }
    fields
}

/// OpenAPI 3: every request body content entry against `components.schemas`, unioned.
fn openapi3_body_fields(spec: &SpecDocument, op: &Operation) -> Vec<FieldSpec> {
    let mut fields = Vec::new();
    let Some(body) = &op.spec.request_body else {
        return fields;
    };
    for media in body.content.values() {
        let inline_type = media.schema.as_ref().and_then(|s| s.kind.as_deref());
        merge_fields(
            &mut fields,
            resolve_fields(media.schema.as_ref(), inline_type, &spec.components.schemas),
        );
    }
    fields
}
