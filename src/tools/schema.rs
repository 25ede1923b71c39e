//! Declarative parameter schemas for registered tools
//!
//! Callers describe a tool's accepted inputs with an explicit builder rather
//! than runtime introspection. Building the JSON input schema from a
//! [`ToolSchema`] is pure and deterministic: equal builders always produce
//! equal values.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Declared type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    /// No declared type; treated as a string on the wire
    Untyped,
}

impl ParamType {
    /// JSON schema type tag for this parameter type
    pub fn type_tag(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
            ParamType::Untyped => "string",
        }
    }
}

/// Declaration of a single tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,

    /// Declared type
    pub ty: ParamType,

    /// Default value; a parameter with no default is required
    pub default: Option<Value>,
}

impl ParamSpec {
    /// Whether the parameter must be supplied by the model
    pub fn required(&self) -> bool {
        self.default.is_none()
    }
}

/// Declarative schema for one tool: parameters plus description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Description shown to the model; empty when the caller supplied none
    #[serde(default)]
    pub description: String,

    /// Parameter declarations in insertion order
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

impl ToolSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tool description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a required parameter
    pub fn param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// Add an optional parameter with a default value
    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        ty: ParamType,
        default: Value,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            ty,
            default: Some(default),
        });
        self
    }

    /// Look up a parameter declaration by name
    pub fn get_param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Project the schema into the provider's JSON input-schema format
    pub fn input_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            properties.insert(param.name.clone(), json!({"type": param.ty.type_tag()}));
            if param.required() {
                required.push(Value::String(param.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_iff_no_default() {
        let schema = ToolSchema::new()
            .param("table", ParamType::String)
            .param_with_default("limit", ParamType::Integer, json!(10));

        assert!(schema.get_param("table").unwrap().required());
        assert!(!schema.get_param("limit").unwrap().required());

        let value = schema.input_schema();
        assert_eq!(value["required"], json!(["table"]));
    }

    #[test]
    fn test_untyped_falls_back_to_string() {
        let schema = ToolSchema::new().param("anything", ParamType::Untyped);
        let value = schema.input_schema();
        assert_eq!(value["properties"]["anything"]["type"], "string");
    }

    #[test]
    fn test_empty_schema() {
        let value = ToolSchema::new().input_schema();
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"], json!({}));
        assert_eq!(value["required"], json!([]));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let build = || {
            ToolSchema::new()
                .description("describe a table")
                .param("table", ParamType::String)
                .param_with_default("verbose", ParamType::Boolean, json!(false))
        };
        assert_eq!(build().input_schema(), build().input_schema());
        assert_eq!(build(), build());
    }

    #[test]
    fn test_description_defaults_to_empty() {
        assert_eq!(ToolSchema::new().description, "");
    }
}
