//! Tool registry: engine-supplied callables keyed by action identifier
//!
//! The workflow engine hands the addon tool groups (a named bundle of action
//! identifiers plus free-form metadata) together with the callables backing
//! each identifier. The registry stores them for the duration of one
//! conversation turn and projects them into the provider's function-calling
//! wire format. Lifecycle discipline is register, execute one action to
//! completion, clear; the registry has no internal locking and is not meant
//! to be shared between concurrent turns.

use crate::tools::schema::{ParamType, ToolSchema};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::llm::ToolDefinition;

/// Callable backing one action identifier
///
/// Receives the model-supplied arguments as a JSON object and returns either
/// a JSON result or an error message. Errors never escape the conversation
/// loop; they are folded into per-call error results.
pub type ToolFn = Arc<dyn Fn(Value) -> std::result::Result<Value, String> + Send + Sync>;

/// A callable plus its declared parameter schema
#[derive(Clone)]
pub struct ToolFunction {
    /// The executable function
    pub handler: ToolFn,

    /// Declared parameters and description
    pub schema: ToolSchema,
}

impl ToolFunction {
    /// Create a tool function from a schema and a closure
    pub fn new<F>(schema: ToolSchema, handler: F) -> Self
    where
        F: Fn(Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            schema,
        }
    }
}

/// One entry of the engine's tools dictionary
///
/// `action` names the identifiers this group contributes; every other field
/// is carried verbatim as group metadata and never interpreted here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolGroup {
    /// Action identifiers backed by this group; the engine sends either a
    /// list or a lone identifier string
    #[serde(default, deserialize_with = "string_or_list")]
    pub action: Vec<String>,

    /// Engine-specific extras (target addon id, behavior tags, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(action) => vec![action],
        OneOrMany::Many(actions) => actions,
    })
}

/// A tool registered for the current conversation turn
#[derive(Clone)]
pub struct RegisteredTool {
    /// Namespaced action identifier, e.g. `"db::describe"`
    pub action_id: String,

    /// The executable function
    pub handler: ToolFn,

    /// Declared parameter schema
    pub schema: ToolSchema,

    /// Description shown to the model
    pub description: String,

    /// Opaque caller-supplied metadata, passed through untouched
    pub group_metadata: serde_json::Map<String, Value>,
}

impl RegisteredTool {
    /// Project this tool into the provider's wire format
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.action_id.clone(),
            description: self.description.clone(),
            input_schema: self.schema.input_schema(),
        }
    }
}

/// Registry of tools available to the current conversation turn
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    // Registration order; wire format must present tools in a stable,
    // predictable sequence across rounds
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the tools of one or more groups
    ///
    /// Identifiers with no matching function are skipped without aborting
    /// the rest; colliding identifiers overwrite prior entries. May be
    /// called repeatedly to merge additional groups.
    pub fn register(
        &mut self,
        tools_dict: &[(String, ToolGroup)],
        tool_functions: &HashMap<String, ToolFunction>,
        context: &str,
    ) {
        tracing::debug!("Loading tools: {} tool groups", tools_dict.len());

        for (group_name, group) in tools_dict {
            for action_id in &group.action {
                match tool_functions.get(action_id) {
                    Some(function) => {
                        self.register_single(action_id, function, &group.extra, context);
                    }
                    None => {
                        tracing::warn!(
                            "Skipping action '{}' in group '{}': no matching function",
                            action_id,
                            group_name
                        );
                    }
                }
            }
        }

        tracing::info!(
            "Registry now holds {} tools: {:?}",
            self.order.len(),
            self.order
        );
    }

    fn register_single(
        &mut self,
        action_id: &str,
        function: &ToolFunction,
        extra: &serde_json::Map<String, Value>,
        context: &str,
    ) {
        let description = if function.schema.description.is_empty() {
            context.to_string()
        } else {
            function.schema.description.clone()
        };

        let tool = RegisteredTool {
            action_id: action_id.to_string(),
            handler: Arc::clone(&function.handler),
            schema: function.schema.clone(),
            description,
            group_metadata: extra.clone(),
        };

        if self.tools.insert(action_id.to_string(), tool).is_none() {
            self.order.push(action_id.to_string());
        }
    }

    /// Snapshot of the currently registered tools, in registration order
    ///
    /// Handlers are reference-counted, so a snapshot stays usable after a
    /// later `clear`.
    pub fn list(&self) -> Vec<RegisteredTool> {
        self.order
            .iter()
            .filter_map(|id| self.tools.get(id))
            .cloned()
            .collect()
    }

    /// Get the callable for an action identifier
    pub fn resolve(&self, action_id: &str) -> Option<ToolFn> {
        self.tools.get(action_id).map(|t| Arc::clone(&t.handler))
    }

    /// Project the registry into the provider's wire format
    pub fn wire_format(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|id| self.tools.get(id))
            .map(RegisteredTool::definition)
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove all entries; idempotent
    pub fn clear(&mut self) {
        self.tools.clear();
        self.order.clear();
    }

    /// Repair stringly-typed arguments before invocation
    ///
    /// Models occasionally serialize object or array arguments as JSON text.
    /// Any string argument whose declared type is `Object` or `Array` and
    /// which looks like JSON is parsed into a structured value; strings that
    /// fail to parse pass through unchanged for the tool to reject.
    pub fn coerce_arguments(&self, action_id: &str, arguments: Value) -> Value {
        let Some(tool) = self.tools.get(action_id) else {
            return arguments;
        };
        let Value::Object(mut map) = arguments else {
            return arguments;
        };

        for (name, value) in map.iter_mut() {
            let Some(param) = tool.schema.get_param(name) else {
                continue;
            };
            if !matches!(param.ty, ParamType::Object | ParamType::Array) {
                continue;
            }
            let Value::String(text) = &*value else {
                continue;
            };

            let trimmed = text.trim();
            let replacement = if trimmed.starts_with('{') || trimmed.starts_with('[') {
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(parsed) => {
                        tracing::debug!("Auto-parsed JSON for '{}' in '{}'", name, action_id);
                        Some(parsed)
                    }
                    Err(_) => {
                        tracing::warn!("Could not parse JSON for '{}' in '{}'", name, action_id);
                        None
                    }
                }
            } else if matches!(trimmed, "null" | "None" | "") && param.default.is_none() {
                Some(Value::Null)
            } else {
                None
            };

            if let Some(parsed) = replacement {
                *value = parsed;
            }
        }

        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_function(description: &str) -> ToolFunction {
        ToolFunction::new(ToolSchema::new().description(description), |_| {
            Ok(json!({"ok": true}))
        })
    }

    fn group(actions: &[&str]) -> ToolGroup {
        ToolGroup {
            action: actions.iter().map(|s| s.to_string()).collect(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert("db::describe".to_string(), noop_function("describe tables"));

        registry.register(
            &[("db".to_string(), group(&["db::describe"]))],
            &functions,
            "shared context",
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("db::describe").is_some());
        assert!(registry.resolve("db::missing").is_none());
    }

    #[test]
    fn test_missing_function_skipped_without_corrupting_others() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert("db::describe".to_string(), noop_function(""));

        registry.register(
            &[("db".to_string(), group(&["db::describe"]))],
            &functions,
            "",
        );
        // Second group references a function nobody supplied
        registry.register(
            &[("broken".to_string(), group(&["broken::ghost"]))],
            &functions,
            "",
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("db::describe").is_some());
        assert!(registry.resolve("broken::ghost").is_none());
    }

    #[test]
    fn test_clear_is_complete_and_idempotent() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert("db::describe".to_string(), noop_function(""));
        registry.register(
            &[("db".to_string(), group(&["db::describe"]))],
            &functions,
            "",
        );

        registry.clear();
        assert!(registry.list().is_empty());
        assert!(registry.wire_format().is_empty());
        registry.clear();
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_reregistration_replaces_fully() {
        let mut registry = ToolRegistry::new();

        let mut first = HashMap::new();
        first.insert(
            "db::describe".to_string(),
            ToolFunction::new(
                ToolSchema::new()
                    .description("old")
                    .param("stale", ParamType::String),
                |_| Ok(json!("old")),
            ),
        );
        let mut second = HashMap::new();
        second.insert(
            "db::describe".to_string(),
            ToolFunction::new(ToolSchema::new().description("new"), |_| Ok(json!("new"))),
        );

        registry.register(
            &[("db".to_string(), group(&["db::describe"]))],
            &first,
            "",
        );
        registry.register(
            &[("db".to_string(), group(&["db::describe"]))],
            &second,
            "",
        );

        assert_eq!(registry.len(), 1);
        let tools = registry.list();
        assert_eq!(tools[0].description, "new");
        // No merge of stale fields from the first registration
        assert!(tools[0].schema.get_param("stale").is_none());
        let handler = registry.resolve("db::describe").unwrap();
        assert_eq!(handler(json!({})).unwrap(), json!("new"));
    }

    #[test]
    fn test_wire_format_preserves_insertion_order() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert("b::second".to_string(), noop_function(""));
        functions.insert("a::first".to_string(), noop_function(""));

        registry.register(
            &[("g".to_string(), group(&["b::second", "a::first"]))],
            &functions,
            "",
        );

        let names: Vec<String> = registry.wire_format().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b::second", "a::first"]);
    }

    #[test]
    fn test_empty_registry_formats_to_empty_list() {
        assert!(ToolRegistry::new().wire_format().is_empty());
    }

    #[test]
    fn test_context_is_description_fallback() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert("db::describe".to_string(), noop_function(""));
        functions.insert("db::query".to_string(), noop_function("run a query"));

        registry.register(
            &[("db".to_string(), group(&["db::describe", "db::query"]))],
            &functions,
            "database tools",
        );

        let defs = registry.wire_format();
        assert_eq!(defs[0].description, "database tools");
        assert_eq!(defs[1].description, "run a query");
    }

    #[test]
    fn test_group_metadata_carried_verbatim() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert("db::describe".to_string(), noop_function(""));

        let mut extra = serde_json::Map::new();
        extra.insert("addon_id".to_string(), json!("pg-addon"));
        extra.insert("tags".to_string(), json!(["readonly"]));

        registry.register(
            &[(
                "db".to_string(),
                ToolGroup {
                    action: vec!["db::describe".to_string()],
                    extra,
                },
            )],
            &functions,
            "",
        );

        let tools = registry.list();
        assert_eq!(tools[0].group_metadata["addon_id"], json!("pg-addon"));
        assert_eq!(tools[0].group_metadata["tags"], json!(["readonly"]));
    }

    #[test]
    fn test_snapshot_survives_clear() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert("db::describe".to_string(), noop_function(""));
        registry.register(
            &[("db".to_string(), group(&["db::describe"]))],
            &functions,
            "",
        );

        let snapshot = registry.list();
        registry.clear();
        assert_eq!(snapshot.len(), 1);
        assert_eq!((snapshot[0].handler)(json!({})).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_group_without_actions_is_noop() {
        let mut registry = ToolRegistry::new();
        let functions = HashMap::new();
        registry.register(&[("empty".to_string(), group(&[]))], &functions, "");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_group_action_accepts_string_and_list() {
        let single: ToolGroup = serde_json::from_value(json!({"action": "db::describe"})).unwrap();
        assert_eq!(single.action, vec!["db::describe"]);

        let many: ToolGroup = serde_json::from_value(json!({"action": ["a::x", "b::y"]})).unwrap();
        assert_eq!(many.action, vec!["a::x", "b::y"]);

        let absent: ToolGroup = serde_json::from_value(json!({"addon_id": "pg"})).unwrap();
        assert!(absent.action.is_empty());
    }

    #[test]
    fn test_coerce_arguments_parses_stringly_json() {
        let mut registry = ToolRegistry::new();
        let mut functions = HashMap::new();
        functions.insert(
            "db::insert".to_string(),
            ToolFunction::new(
                ToolSchema::new()
                    .param("row", ParamType::Object)
                    .param("tags", ParamType::Array)
                    .param("name", ParamType::String),
                |_| Ok(json!(null)),
            ),
        );
        registry.register(
            &[("db".to_string(), group(&["db::insert"]))],
            &functions,
            "",
        );

        let coerced = registry.coerce_arguments(
            "db::insert",
            json!({
                "row": "{\"id\": 1}",
                "tags": "[\"a\", \"b\"]",
                "name": "{not json, stays a string}",
            }),
        );

        assert_eq!(coerced["row"], json!({"id": 1}));
        assert_eq!(coerced["tags"], json!(["a", "b"]));
        assert_eq!(coerced["name"], json!("{not json, stays a string}"));
    }

    #[test]
    fn test_coerce_arguments_unknown_tool_passthrough() {
        let registry = ToolRegistry::new();
        let args = json!({"x": "[1]"});
        assert_eq!(registry.coerce_arguments("nope", args.clone()), args);
    }
}
