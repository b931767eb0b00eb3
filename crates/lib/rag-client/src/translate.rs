//! Conversion between function-calling schema conventions.
//!
//! MCP tools are described with an `input_schema`; OpenAI-style chat APIs
//! expect a `parameters` object instead. The conversion is one-directional and
//! lossy: only `type`, `properties` and `required` survive.

use rmcp::model::Tool;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

const FUNCTION_TYPE: &str = "function";

/// Target-format tool: `{"type": "function", "function": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionSpec,
}

/// Name, description and parameter schema of a callable function.
///
/// `name` and `description` are copied verbatim from the source entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: Value,
    pub description: Value,
    pub parameters: Map<String, Value>,
}

impl FunctionTool {
    /// The function name when it is a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.function.name.as_str()
    }
}

/// Converts source-format tools into target-format tools.
///
/// Entries that are not objects with `type` and `function`, or whose
/// `function` lacks `name` or `description`, are skipped. Input order is kept.
#[must_use]
pub fn transform_tools(items: &[Value]) -> Vec<FunctionTool> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let converted = transform_tool(item);
            if converted.is_none() {
                debug!(index, "skipping malformed tool entry");
            }
            converted
        })
        .collect()
}

fn transform_tool(item: &Value) -> Option<FunctionTool> {
    let envelope = item.as_object()?;
    if !envelope.contains_key("type") {
        return None;
    }
    let function = envelope.get("function")?.as_object()?;
    let name = function.get("name")?;
    let description = function.get("description")?;

    let mut parameters = Map::new();
    if let Some(schema) = function.get("input_schema").and_then(Value::as_object) {
        parameters.insert(
            "type".to_string(),
            schema
                .get("type")
                .cloned()
                .unwrap_or_else(|| Value::String("object".to_string())),
        );
        parameters.insert(
            "properties".to_string(),
            schema
                .get("properties")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        );
        if let Some(required) = schema.get("required") {
            parameters.insert("required".to_string(), required.clone());
        }
    }

    Some(FunctionTool {
        kind: FUNCTION_TYPE.to_string(),
        function: FunctionSpec {
            name: name.clone(),
            description: description.clone(),
            parameters,
        },
    })
}

/// Renders listed MCP tools in the source format accepted by [`transform_tools`].
#[must_use]
pub fn source_format(tools: &[Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": FUNCTION_TYPE,
                "function": {
                    "name": tool.name.to_string(),
                    "description": tool.description.as_deref(),
                    "input_schema": Value::Object((*tool.input_schema).clone()),
                }
            })
        })
        .collect()
}
