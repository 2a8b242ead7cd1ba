//! Request materializer: turns a [`ToolDescriptor`] plus caller arguments into one outbound HTTP
//! call.
//!
//! Materialization is terminal on the first failure and nothing is sent unless every declared
//! argument was present and coerced. The response body is returned verbatim.

use crate::config::RequestSettings;
use crate::descriptor::{BodyField, FieldType, ParamLocation, ToolDescriptor};
use crate::safety::{redact_url, redact_url_str, sanitize_reqwest_error};
use crate::security::{apply_security, header_pair, set_query_param};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Request};
use rmcp::model::JsonObject;
use serde_json::{Map, Number, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum HttpToolsError {
    #[error("failed to build http client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, HttpToolsError>;

/// Per-invocation failure. Rendered to the agent as an `[Error]` tool result.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("missing or non-string {location} parameter '{name}'")]
    MissingParam {
        location: ParamLocation,
        name: String,
    },
    #[error("invalid value for body field '{name}': expected {expected}")]
    InvalidBodyValue { name: String, expected: FieldType },
    #[error("unsupported type '{tag}' for body field '{name}'")]
    UnsupportedType { name: String, tag: String },
    #[error("invalid request url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid value for header parameter '{name}'")]
    InvalidHeader { name: String },
    #[error("failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("failed to read response body: {0}")]
    ReadBody(String),
}

/// Shared outbound runtime: one pooled client plus the load-time request settings.
#[derive(Debug, Clone)]
pub struct HttpToolRuntime {
    client: Client,
    settings: Arc<RequestSettings>,
}

impl HttpToolRuntime {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend initialization).
    pub fn new(settings: RequestSettings) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| HttpToolsError::Client(sanitize_reqwest_error(&e)))?;
        Ok(Self::with_client(client, settings))
    }

    #[must_use]
    pub fn with_client(client: Client, settings: RequestSettings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
        }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Materialize and send the request for `tool`, returning the raw response body.
    ///
    /// `forwarded` holds headers relayed from the inbound request that triggered this call; they
    /// overwrite anything set earlier under the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`InvokeError`] for a missing or mistyped argument, an unbuildable request, a
    /// transport failure, or an unreadable response body.
    pub async fn invoke(
        &self,
        tool: &ToolDescriptor,
        arguments: &JsonObject,
        forwarded: Option<&HeaderMap>,
    ) -> std::result::Result<Vec<u8>, InvokeError> {
        let request = self.build_request(tool, arguments, forwarded)?;
        let url = redact_url(request.url());
        debug!(tool = %tool.name, method = %tool.method, url = %url, "sending request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| InvokeError::Transport(sanitize_reqwest_error(&e)))?;

        let status = response.status();
        if status.is_success() {
            debug!(tool = %tool.name, status = status.as_u16(), "upstream responded");
        } else {
            warn!(
                tool = %tool.name,
                status = status.as_u16(),
                url = %url,
                "upstream returned non-success status"
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| InvokeError::ReadBody(sanitize_reqwest_error(&e)))?;
        Ok(bytes.to_vec())
    }

    /// Build the outbound request without sending it.
    ///
    /// # Errors
    ///
    /// See [`HttpToolRuntime::invoke`]; transport errors cannot occur here.
    pub fn build_request(
        &self,
        tool: &ToolDescriptor,
        arguments: &JsonObject,
        forwarded: Option<&HeaderMap>,
    ) -> std::result::Result<Request, InvokeError> {
        let mut url = tool.url.clone();
        for name in &tool.path_params {
            let value = string_arg(arguments, name, ParamLocation::Path)?;
            url = url.replacen(&format!("{{{name}}}"), value, 1);
        }

        let mut url = Url::parse(&url).map_err(|e| InvokeError::InvalidUrl {
            url: redact_url_str(&url),
            reason: e.to_string(),
        })?;
        for name in &tool.query_params {
            let value = string_arg(arguments, name, ParamLocation::Query)?;
            set_query_param(&mut url, name, value);
        }

        let mut body = Map::new();
        for field in &tool.body_fields {
            let raw = string_arg(arguments, &field.name, ParamLocation::Body)?;
            body.insert(field.name.clone(), coerce_body_value(field, raw)?);
        }
        let body = serde_json::to_vec(&Value::Object(body))?;

        let mut request = Request::new(tool.method.clone(), url);
        *request.body_mut() = Some(body.into());

        for name in &tool.header_params {
            let value = string_arg(arguments, name, ParamLocation::Header)?;
            let (name, value) =
                header_pair(name, value).ok_or_else(|| InvokeError::InvalidHeader {
                    name: name.clone(),
                })?;
            request.headers_mut().append(name, value);
        }
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        apply_security(&mut request, &self.settings.security);

        for (name, value) in &self.settings.static_headers {
            if let Some((name, value)) = header_pair(name, value) {
                request.headers_mut().append(name, value);
            }
        }

        if let Some(forwarded) = forwarded {
            for name in forwarded.keys() {
                request.headers_mut().remove(name);
            }
            for (name, value) in forwarded {
                request.headers_mut().append(name.clone(), value.clone());
            }
        }

        Ok(request)
    }
}

fn string_arg<'a>(
    arguments: &'a JsonObject,
    name: &str,
    location: ParamLocation,
) -> std::result::Result<&'a str, InvokeError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| InvokeError::MissingParam {
            location,
            name: name.to_string(),
        })
}

/// Coerce the string encoding of a body field into its declared JSON type.
///
/// # Errors
///
/// Returns [`InvokeError::InvalidBodyValue`] when `raw` does not parse as the declared type and
/// [`InvokeError::UnsupportedType`] for tags outside the supported set.
pub fn coerce_body_value(field: &BodyField, raw: &str) -> std::result::Result<Value, InvokeError> {
    let invalid = || InvokeError::InvalidBodyValue {
        name: field.name.clone(),
        expected: field.kind.clone(),
    };

    match &field.kind {
        FieldType::String => Ok(Value::String(raw.to_string())),
        FieldType::Int | FieldType::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        FieldType::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        FieldType::Bool | FieldType::Boolean => {
            parse_bool_literal(raw).map(Value::Bool).ok_or_else(invalid)
        }
        FieldType::Array => match serde_json::from_str::<Value>(raw) {
            Ok(v @ Value::Array(_)) => Ok(v),
            _ => Err(invalid()),
        },
        FieldType::Object => match serde_json::from_str::<Value>(raw) {
            Ok(v @ Value::Object(_)) => Ok(v),
            _ => Err(invalid()),
        },
        FieldType::Unsupported(tag) => Err(InvokeError::UnsupportedType {
            name: field.name.clone(),
            tag: tag.clone(),
        }),
    }
}

/// Boolean literals accepted for `bool`/`boolean` fields.
#[must_use]
pub fn parse_bool_literal(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
