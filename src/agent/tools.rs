//! Tool definitions advertised to the completion API.
//!
//! A [`Tool`] is either a locally handled function or a declarative web
//! search flag. Only the declarative parts are serialized for the wire;
//! handlers never leave the process.

use crate::error::Result;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Boxed asynchronous handler for a function tool.
///
/// Invoked with the parsed argument object the model supplied. Errors are
/// recovered by the agent into a `function`-role error payload, never
/// propagated to the caller.
pub type ToolHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// JSON type of one function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

/// One argument slot of a function tool.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub description: String,
    pub required: bool,
    /// Closed value set advertised to the model, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl FunctionParameter {
    /// Create a required parameter.
    pub fn new(name: &str, kind: ParameterKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
            enum_values: None,
        }
    }

    /// Mark the parameter as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restrict the parameter to a closed value set.
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Context budget for remotely executed web searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    #[default]
    Low,
    Medium,
    High,
}

/// A function tool with a local handler.
#[derive(Clone)]
pub struct FunctionTool {
    pub name: String,
    pub description: String,
    pub parameters: Vec<FunctionParameter>,
    pub handler: ToolHandler,
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A declarative web-search capability; execution happens remotely.
#[derive(Debug, Clone, Copy)]
pub struct WebSearchTool {
    pub enabled: bool,
    pub search_context_size: SearchContextSize,
}

/// A capability advertised to the completion API.
///
/// Tool names must be unique within one agent's tool set; lookup by name
/// resolves to the first match, so duplicates are a caller error.
#[derive(Debug, Clone)]
pub enum Tool {
    Function(FunctionTool),
    WebSearch(WebSearchTool),
}

impl Tool {
    /// Create a function tool from an async handler.
    pub fn function<F, Fut>(
        name: &str,
        description: &str,
        parameters: Vec<FunctionParameter>,
        handler: F,
    ) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Tool::Function(FunctionTool {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        })
    }

    /// Create an enabled web-search tool with the default context size.
    pub fn web_search() -> Self {
        Self::web_search_with(true, SearchContextSize::Low)
    }

    /// Create a web-search tool with explicit settings.
    pub fn web_search_with(enabled: bool, search_context_size: SearchContextSize) -> Self {
        Tool::WebSearch(WebSearchTool {
            enabled,
            search_context_size,
        })
    }

    /// Name used for handler lookup; web search has no name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Tool::Function(f) => Some(&f.name),
            Tool::WebSearch(_) => None,
        }
    }

    /// Wire representation, or `None` when the tool is not advertised
    /// (a disabled web search).
    pub fn spec(&self) -> Option<ToolSpec> {
        match self {
            Tool::Function(f) => Some(ToolSpec::Function {
                function: FunctionSpec {
                    name: f.name.clone(),
                    description: f.description.clone(),
                    parameters: parameters_schema(&f.parameters),
                },
            }),
            Tool::WebSearch(w) if w.enabled => Some(ToolSpec::WebSearch {
                search_context_size: w.search_context_size,
            }),
            Tool::WebSearch(_) => None,
        }
    }
}

/// Serialized tool definition sent to the completion API.
///
/// Carries only declarative fields; there is no handler slot by
/// construction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    Function { function: FunctionSpec },
    WebSearch { search_context_size: SearchContextSize },
}

/// The `function` payload of a serialized function tool.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Build the JSON-schema object describing a function's parameters.
fn parameters_schema(parameters: &[FunctionParameter]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in parameters {
        let mut slot = serde_json::Map::new();
        slot.insert("type".into(), serde_json::to_value(param.kind).unwrap_or_default());
        slot.insert("description".into(), Value::String(param.description.clone()));
        if let Some(values) = &param.enum_values {
            slot.insert("enum".into(), serde_json::json!(values));
        }
        properties.insert(param.name.clone(), Value::Object(slot));
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tool() -> Tool {
        Tool::function(
            "generate_audio",
            "Generate speech audio from text",
            vec![
                FunctionParameter::new("text", ParameterKind::String, "Text to speak"),
                FunctionParameter::new("voice_type", ParameterKind::String, "Voice to use")
                    .optional()
                    .with_enum_values(["luna", "alloy"]),
            ],
            |_args| async { Ok(serde_json::json!({"success": true})) },
        )
    }

    #[test]
    fn test_function_spec_shape() {
        let spec = sample_tool().spec().unwrap();
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "generate_audio");
        let params = &json["function"]["parameters"];
        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["text"]["type"], "string");
        assert_eq!(params["properties"]["voice_type"]["enum"][0], "luna");
        assert_eq!(params["required"], serde_json::json!(["text"]));
    }

    #[test]
    fn test_spec_never_contains_handler() {
        let json = serde_json::to_string(&sample_tool().spec().unwrap()).unwrap();
        assert!(!json.contains("handler"));
    }

    #[test]
    fn test_disabled_web_search_is_not_advertised() {
        let tool = Tool::web_search_with(false, SearchContextSize::High);
        assert!(tool.spec().is_none());
    }

    #[test]
    fn test_web_search_spec_shape() {
        let json = serde_json::to_value(Tool::web_search().spec().unwrap()).unwrap();
        assert_eq!(json["type"], "web_search");
        assert_eq!(json["search_context_size"], "low");
    }

    #[test]
    fn test_optional_parameter_not_required() {
        let schema = parameters_schema(&[
            FunctionParameter::new("a", ParameterKind::Number, "first"),
            FunctionParameter::new("b", ParameterKind::Boolean, "second").optional(),
        ]);
        assert_eq!(schema["required"], serde_json::json!(["a"]));
    }
}
