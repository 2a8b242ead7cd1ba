//! In-memory model of a Swagger 2.0 or OpenAPI 3.0 document.
//!
//! The model carries the fields of both dialects at once and is deliberately lenient: unknown
//! keys are ignored, and an operation or schema whose shape cannot be read is skipped with a
//! warning instead of failing the whole document. [`SpecDocument::dialect`] decides which
//! dialect's rules apply.

use crate::resolver::schema_name_from_ref;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// HTTP methods recognized inside a path item, in iteration order.
pub const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Swagger 2.0: `host`/`basePath`, `definitions`, `in: body` parameters.
    Swagger2,
    /// OpenAPI 3.x: `servers`, `components.schemas`, `requestBody`.
    OpenApi3,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDocument {
    #[serde(default, deserialize_with = "lenient_string")]
    pub swagger: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub openapi: String,
    #[serde(default)]
    pub info: Info,

    #[serde(default, deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub base_path: String,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub components: Components,

    #[serde(default, deserialize_with = "lenient_map")]
    pub definitions: BTreeMap<String, SchemaRef>,
    /// Swagger 2.0 global parameter table, target of local parameter `$ref`s.
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,

    /// Path items, kept raw so that one malformed operation cannot fail the document.
    #[serde(default)]
    pub paths: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Server {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, deserialize_with = "lenient_map")]
    pub schemas: BTreeMap<String, SchemaRef>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub request_bodies: BTreeMap<String, Value>,
}

/// A schema: either a `$ref` pointer or an inline description. A reference always wins.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "schema_type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub properties: BTreeMap<String, SchemaRef>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub required: Vec<String>,
    #[serde(default)]
    pub items: Option<Box<SchemaRef>>,
}

impl SchemaRef {
    /// Primitive type tag of this schema when used as a property.
    ///
    /// Without an explicit `type`, references and schemas with properties are objects and
    /// schemas with `items` are arrays. Anything else has an empty tag.
    #[must_use]
    pub fn type_tag(&self) -> String {
        if let Some(kind) = &self.kind {
            return kind.clone();
        }
        if self.reference.is_some() || !self.properties.is_empty() {
            "object".to_string()
        } else if self.items.is_some() {
            "array".to_string()
        } else {
            String::new()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    /// `formData`, `cookie`, or anything else; never turned into a tool input.
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterSpec {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "in", default, deserialize_with = "lenient_location")]
    pub location: ParameterLocation,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
    #[serde(rename = "type", default, deserialize_with = "schema_type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient_schema")]
    pub schema: Option<SchemaRef>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaType {
    #[serde(default, deserialize_with = "lenient_schema")]
    pub schema: Option<SchemaRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestBodySpec {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSpec {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub operation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default, deserialize_with = "lenient_request_body")]
    pub request_body: Option<RequestBodySpec>,
    /// Kept raw; responses never shape a tool.
    #[serde(default)]
    pub responses: Value,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub consumes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub produces: Vec<String>,
}

/// One (path, method) pair with its merged operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub path: String,
    pub method: &'static str,
    pub spec: OperationSpec,
}

impl SpecDocument {
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        if self.openapi.trim().is_empty() {
            Dialect::Swagger2
        } else {
            Dialect::OpenApi3
        }
    }

    /// The global schema table of this document's dialect.
    #[must_use]
    pub fn schema_table(&self) -> &BTreeMap<String, SchemaRef> {
        match self.dialect() {
            Dialect::Swagger2 => &self.definitions,
            Dialect::OpenApi3 => &self.components.schemas,
        }
    }

    /// Every operation in the document: paths in sorted order, methods in [`METHODS`] order.
    ///
    /// Path-level parameters are merged into each operation (an operation parameter with the
    /// same name and location replaces the path-level one) and local parameter and request body
    /// `$ref`s are resolved.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        let mut out = Vec::new();
        for (path, item) in &self.paths {
            let Some(item) = item.as_object() else {
                warn!(path = %path, "skipping path item that is not an object");
                continue;
            };

            let shared: Vec<ParameterSpec> = match item.get("parameters") {
                Some(v) => from_value_or_warn(v, path, "path-level parameters").unwrap_or_default(),
                None => Vec::new(),
            };

            for method in METHODS {
                let Some(raw) = item.get(method) else {
                    continue;
                };
                let Some(mut spec) = from_value_or_warn::<OperationSpec>(raw, path, method) else {
                    continue;
                };
                spec.parameters = self.merge_parameters(&shared, &spec.parameters);
                spec.request_body = spec.request_body.and_then(|b| self.resolve_request_body(b));
                out.push(Operation {
                    path: path.clone(),
                    method,
                    spec,
                });
            }
        }
        out
    }

    fn merge_parameters(
        &self,
        path_level: &[ParameterSpec],
        operation_level: &[ParameterSpec],
    ) -> Vec<ParameterSpec> {
        let mut merged: Vec<ParameterSpec> = Vec::new();
        for p in path_level.iter().chain(operation_level) {
            let Some(p) = self.resolve_parameter(p) else {
                continue;
            };
            match merged
                .iter_mut()
                .find(|m| m.name == p.name && m.location == p.location)
            {
                Some(existing) => *existing = p,
                None => merged.push(p),
            }
        }
        merged
    }

    /// Follow a local parameter `$ref` into the dialect's parameter table.
    ///
    /// Returns `None` when the target does not exist or cannot be read.
    #[must_use]
    pub fn resolve_parameter(&self, parameter: &ParameterSpec) -> Option<ParameterSpec> {
        let Some(reference) = &parameter.reference else {
            return Some(parameter.clone());
        };
        let table = match self.dialect() {
            Dialect::Swagger2 => &self.parameters,
            Dialect::OpenApi3 => &self.components.parameters,
        };
        let key = schema_name_from_ref(reference);
        let Some(raw) = table.get(key) else {
            debug!(reference = %reference, "unresolved parameter reference");
            return None;
        };
        from_value_or_warn(raw, reference, "parameter")
    }

    fn resolve_request_body(&self, body: RequestBodySpec) -> Option<RequestBodySpec> {
        let Some(reference) = &body.reference else {
            return Some(body);
        };
        let key = schema_name_from_ref(reference);
        let Some(raw) = self.components.request_bodies.get(key) else {
            debug!(reference = %reference, "unresolved request body reference");
            return None;
        };
        from_value_or_warn(raw, reference, "request body")
    }
}

fn from_value_or_warn<T: DeserializeOwned>(raw: &Value, at: &str, what: &str) -> Option<T> {
    match T::deserialize(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(at = %at, what = %what, error = %e, "skipping unreadable spec entry");
            None
        }
    }
}

/// Accept strings, numbers and booleans (`swagger: 2.0` unquoted in YAML is a float).
/// Null and anything else read as empty.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// `true`/`false`, also quoted; null and anything else read as false.
fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn lenient_location<'de, D: Deserializer<'de>>(d: D) -> Result<ParameterLocation, D::Error> {
    let raw = Value::deserialize(d)?;
    Ok(ParameterLocation::deserialize(&raw).unwrap_or_default())
}

fn lenient_schema<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SchemaRef>, D::Error> {
    let raw = Value::deserialize(d)?;
    if raw.is_null() {
        return Ok(None);
    }
    Ok(from_value_or_warn(&raw, "schema", "schema"))
}

fn lenient_request_body<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<RequestBodySpec>, D::Error> {
    let raw = Value::deserialize(d)?;
    if raw.is_null() {
        return Ok(None);
    }
    Ok(from_value_or_warn(&raw, "requestBody", "request body"))
}

/// A list whose unreadable entries are dropped; null or a non-list reads as empty.
fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| from_value_or_warn(v, "list", "entry"))
            .collect(),
        _ => Vec::new(),
    })
}

/// `type` may be a single string or, in newer schemas, a list such as `["string", "null"]`.
fn schema_type<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .find(|t| t != "null"),
        _ => None,
    })
}

/// Deserialize a name → schema map, dropping entries that are not readable schemas.
fn lenient_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, SchemaRef>, D::Error> {
    let raw = Option::<BTreeMap<String, Value>>::deserialize(d)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(name, v)| {
            let schema = from_value_or_warn::<SchemaRef>(&v, &name, "schema")?;
            Some((name, schema))
        })
        .collect())
}
