//! Immutable description of one invocable HTTP tool.
//!
//! A [`ToolDescriptor`] is derived once at load time and never mutated afterwards. It carries
//! everything the request materializer needs: the URL template, which argument goes where, and
//! how body fields are coerced.

use reqwest::Method;
use rmcp::model::{JsonObject, Tool};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Primitive type tag of a body field.
///
/// Tags outside the supported set are kept verbatim so the invocation error can name them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Int,
    Integer,
    Float,
    Bool,
    Boolean,
    Array,
    Object,
    Unsupported(String),
}

impl FieldType {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => FieldType::String,
            "int" => FieldType::Int,
            "integer" => FieldType::Integer,
            "float" => FieldType::Float,
            "bool" => FieldType::Bool,
            "boolean" => FieldType::Boolean,
            "array" => FieldType::Array,
            "object" => FieldType::Object,
            other => FieldType::Unsupported(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Unsupported(tag) => tag,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named, typed element of a resolved request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyField {
    pub name: String,
    pub kind: FieldType,
}

impl BodyField {
    #[must_use]
    pub fn new(name: impl Into<String>, tag: &str) -> Self {
        Self {
            name: name.into(),
            kind: FieldType::from_tag(tag),
        }
    }
}

/// Where a declared tool input ends up in the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Body,
}

impl ParamLocation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Body => "body",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single input advertised in the tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInput {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Exposed tool name.
    pub name: String,
    pub method: Method,
    /// Absolute request URL with `{param}` placeholders left in place.
    pub url: String,
    pub path_params: Vec<String>,
    pub query_params: Vec<String>,
    pub header_params: Vec<String>,
    pub body_fields: Vec<BodyField>,
    /// Usage text shown to the agent.
    pub description: String,
    /// Operation summary, used as the tool title when present.
    pub summary: Option<String>,
    /// Declared inputs in declaration order (headers, query, path, body).
    pub inputs: Vec<ToolInput>,
}

impl ToolDescriptor {
    /// JSON Schema for the tool arguments.
    ///
    /// Every argument is a string; typed body values are carried in their string encoding and
    /// coerced at call time. A name declared more than once is required if any declaration is.
    #[must_use]
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = serde_json::Map::new();
        let mut required: Vec<String> = Vec::new();

        for input in &self.inputs {
            properties.insert(
                input.name.clone(),
                json!({
                    "type": "string",
                    "description": input.description,
                }),
            );
            if input.required && !required.contains(&input.name) {
                required.push(input.name.clone());
            }
        }

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema
    }

    /// The MCP `Tool` advertised for this descriptor.
    #[must_use]
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::new(self.input_schema()),
        );
        tool.annotations = Some(crate::semantics::annotations_for_operation(
            &self.method,
            self.summary.as_deref(),
        ));
        tool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ToolDescriptor {
        ToolDescriptor {
            name: "post__pets".to_string(),
            method: Method::POST,
            url: "https://api.example.com/pets".to_string(),
            path_params: Vec::new(),
            query_params: vec!["dryRun".to_string()],
            header_params: Vec::new(),
            body_fields: vec![BodyField::new("age", "integer")],
            description: "Create a pet".to_string(),
            summary: Some("Create a pet".to_string()),
            inputs: vec![
                ToolInput {
                    name: "dryRun".to_string(),
                    location: ParamLocation::Query,
                    required: false,
                    description: "The data for dryRun".to_string(),
                },
                ToolInput {
                    name: "age".to_string(),
                    location: ParamLocation::Body,
                    required: true,
                    description: "The data for age, it should be in format of integer".to_string(),
                },
                ToolInput {
                    name: "dryRun".to_string(),
                    location: ParamLocation::Body,
                    required: true,
                    description: "The data for dryRun, it should be in format of bool".to_string(),
                },
            ],
        }
    }

    #[test]
    fn field_type_round_trips_tags() {
        for tag in ["string", "int", "integer", "float", "bool", "boolean", "array", "object"] {
            assert_eq!(FieldType::from_tag(tag).as_str(), tag);
        }
        assert_eq!(
            FieldType::from_tag("number"),
            FieldType::Unsupported("number".to_string())
        );
    }

    #[test]
    fn input_schema_declares_string_properties_and_merges_required() {
        let schema = descriptor().input_schema();
        assert_eq!(schema.get("type"), Some(&json!("object")));

        let props = schema
            .get("properties")
            .and_then(Value::as_object)
            .expect("properties");
        assert_eq!(props.len(), 2);
        assert_eq!(props["age"]["type"], "string");

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .expect("required");
        assert_eq!(required, &vec![json!("age"), json!("dryRun")]);
    }

    #[test]
    fn to_tool_carries_description_and_annotations() {
        let tool = descriptor().to_tool();
        assert_eq!(tool.name, "post__pets");
        assert_eq!(tool.description.as_deref(), Some("Create a pet"));
        let annotations = tool.annotations.expect("annotations");
        assert_eq!(annotations.title.as_deref(), Some("Create a pet"));
        assert_eq!(annotations.read_only_hint, Some(false));
    }
}
