//! Tool trait and registry: the abstraction over agent capabilities.
//!
//! Tools are what let the agent gather material before it writes:
//! search for trends, look up product facts, pick emojis.
//!
//! The [`ToolRegistry`] is a name-keyed dispatch table. Dispatch is
//! infallible from the caller's side: unknown names, arguments that violate
//! the declared schema, handler errors and handler panics all come back as
//! an `ok = false` [`ToolResult`].

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// A request to execute a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON object
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    #[serde(default)]
    pub call_id: String,

    /// Name of the tool that produced it
    #[serde(default)]
    pub name: String,

    /// Whether the tool executed successfully
    pub ok: bool,

    /// The output content, as shown to the model
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// A successful result. The registry fills in `call_id` and `name`.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            name: String::new(),
            ok: true,
            output: output.into(),
            data: None,
        }
    }

    /// A failed result carrying a diagnostic for the model.
    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::success(output)
        }
    }

    /// Attach structured data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The text fed back to the model. Failed results carry an `Error:`
    /// prefix whether the registry or the handler reported them.
    pub fn observation(&self) -> String {
        if self.ok {
            self.output.clone()
        } else {
            format!("Error: {}", self.output)
        }
    }
}

/// The core Tool trait.
///
/// Handlers should be side-effect isolated. Returning `Err` (or panicking)
/// is converted to an `ok = false` result at the registry boundary.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "search_web").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with already schema-checked arguments.
    async fn execute(&self, arguments: serde_json::Value)
    -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

type Handler =
    dyn Fn(serde_json::Value) -> std::result::Result<ToolResult, ToolError> + Send + Sync;

/// A tool backed by a plain function, for handlers registered at runtime.
pub struct FnTool {
    name: String,
    description: String,
    schema: serde_json::Value,
    handler: Box<Handler>,
}

impl FnTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: serde_json::Value,
        handler: F,
    ) -> Self
    where
        F: Fn(serde_json::Value) -> std::result::Result<ToolResult, ToolError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.schema.clone()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        (self.handler)(arguments)
    }
}

/// A registry of available tools.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the model
/// 2. Dispatch the calls the model requests
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Register a plain function as a tool.
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: serde_json::Value,
        handler: F,
    ) where
        F: Fn(serde_json::Value) -> std::result::Result<ToolResult, ToolError>
            + Send
            + Sync
            + 'static,
    {
        self.register(Box::new(FnTool::new(name, description, schema, handler)));
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool definitions, sorted by name so prompts are stable.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call, turning every fault into an `ok = false` result.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let mut result = match self.try_dispatch(call).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool dispatch failed");
                ToolResult::failure(e.to_string())
            }
        };
        result.call_id = call.id.clone();
        result.name = call.name.clone();
        debug!(tool = %call.name, ok = result.ok, "Tool dispatched");
        result
    }

    async fn try_dispatch(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self.tools.get(&call.name).ok_or_else(|| {
            ToolError::NotFound(format!(
                "'{}' (available: {})",
                call.name,
                self.names().join(", ")
            ))
        })?;

        let arguments = match &call.arguments {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        check_arguments(&tool.parameters_schema(), &arguments)?;

        match AssertUnwindSafe(tool.execute(arguments)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(ToolError::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check arguments against the subset of JSON Schema tools declare:
/// an object with `required` keys and primitive `type`s per property.
pub fn check_arguments(
    schema: &serde_json::Value,
    arguments: &serde_json::Value,
) -> std::result::Result<(), ToolError> {
    let args = arguments.as_object().ok_or_else(|| {
        ToolError::InvalidArguments(format!(
            "arguments must be a JSON object, got {}",
            json_type_name(arguments)
        ))
    })?;

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for key in required.iter().filter_map(|k| k.as_str()) {
            if args.get(key).is_none_or(|v| v.is_null()) {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required argument '{key}'"
                )));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        for (key, value) in args {
            let Some(expected) = properties
                .get(key)
                .and_then(|p| p.get("type"))
                .and_then(|t| t.as_str())
            else {
                continue;
            };
            if !matches_type(expected, value) {
                return Err(ToolError::InvalidArguments(format!(
                    "argument '{key}' must be {expected}, got {}",
                    json_type_name(value)
                )));
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &serde_json::Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // Unknown type keywords are not enforced
        _ => true,
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
