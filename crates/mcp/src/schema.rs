// Schema derivation: build a tool's wire schema from its registration-time
// descriptor (declared name, doc text, ordered parameter list).

use crate::protocol::{InputSchema, ToolSchema};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Registration-time descriptor of a tool implementation.
///
/// The descriptor mirrors what a dynamic runtime would introspect from the
/// implementation itself: its snake_case function name, its documentation
/// comment, and its parameters in declaration order. The doc text follows
/// the conventional layout -- a summary paragraph, then an optional `Args:`
/// section with one `name: description` line per parameter, then an
/// optional `Returns:` section (ignored here).
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub fn_name: String,
    pub doc: String,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(fn_name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            fn_name: fn_name.into(),
            doc: doc.into(),
            params: Vec::new(),
        }
    }

    /// Declare the next parameter (declaration order is significant)
    pub fn param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
        });
        self
    }
}

/// A declared parameter: name plus declared type
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
}

/// Declared parameter types, mapped to JSON schema types via a fixed table.
/// Anything without a specific mapping serializes as "string".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Bool,
    Text,
    /// Untyped or unrecognized declaration; treated as a string
    Opaque,
}

impl ParamKind {
    pub fn json_type(self) -> &'static str {
        match self {
            ParamKind::Int => "integer",
            ParamKind::Float => "number",
            ParamKind::Bool => "boolean",
            ParamKind::Text | ParamKind::Opaque => "string",
        }
    }
}

/// Errors raised while deriving a schema. These are programmer errors in
/// the tool descriptor and fail registration at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Tool function name must not be empty")]
    EmptyName,
    #[error("Tool '{0}' declares a parameter with an empty name")]
    EmptyParamName(String),
}

/// Derive the wire schema for a tool from its descriptor
pub fn derive_schema(spec: &ToolSpec) -> Result<ToolSchema, SchemaError> {
    if spec.fn_name.trim().is_empty() {
        return Err(SchemaError::EmptyName);
    }

    let name = camel_case_name(&spec.fn_name);
    let doc = spec.doc.trim();

    // First paragraph of the doc is the tool description
    let description = doc.split("\n\n").next().unwrap_or("").to_string();

    let arg_descriptions = parse_arg_descriptions(doc);

    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in &spec.params {
        if param.name.trim().is_empty() {
            return Err(SchemaError::EmptyParamName(name));
        }

        let mut property = serde_json::Map::new();
        property.insert("type".to_string(), json!(param.kind.json_type()));
        if let Some(desc) = arg_descriptions.get(&param.name) {
            property.insert("description".to_string(), json!(desc));
        }

        properties.insert(param.name.clone(), Value::Object(property));
        // Every declared parameter is required; there is no optional-parameter
        // schema entry even when the implementation has a default value.
        required.push(param.name.clone());
    }

    Ok(ToolSchema {
        name,
        description,
        input_schema: InputSchema::object(properties, required),
    })
}

/// Convert a snake_case function name to the camelCase tool name:
/// the first word is kept as-is, each subsequent word is capitalized.
pub fn camel_case_name(fn_name: &str) -> String {
    let mut words = fn_name.split('_');
    let mut name = words.next().unwrap_or("").to_string();
    for word in words {
        name.push_str(&capitalize(word));
    }
    name
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Extract per-parameter descriptions from the doc's `Args:` section.
///
/// The section starts at a line whose trimmed content is exactly `Args:`
/// and ends at a blank line or a line starting with `Returns:`. Each line
/// in between is split on its first colon into a parameter name and its
/// description.
fn parse_arg_descriptions(doc: &str) -> HashMap<String, String> {
    let mut descriptions = HashMap::new();
    let mut in_args = false;

    for line in doc.lines() {
        let trimmed = line.trim();
        if !in_args {
            if trimmed == "Args:" {
                in_args = true;
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("Returns:") {
            break;
        }
        if let Some((name, description)) = trimmed.split_once(':') {
            descriptions.insert(name.trim().to_string(), description.trim().to_string());
        }
    }

    descriptions
}
