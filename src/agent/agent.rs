//! Agent: one conversation's history, tool set, and completion loop.

use super::message::{FunctionCall, Message, Role, ToolCallKind};
use super::tools::{Tool, ToolHandler};
use crate::completion::{CompletionBackend, CompletionRequest};
use crate::error::{Result, StafettError};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// The externally visible result of one `process` or `run` call.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    /// Final assistant message.
    pub message: Message,
    /// Names of function tools executed during this turn, in call order.
    pub used_tools: Vec<String>,
    /// Whether the model requested a web search during this turn.
    pub used_web_search: bool,
    /// Raw provider response, present only for debug-configured agents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
}

/// Tool-usage bookkeeping accumulated across one turn's completion rounds.
#[derive(Debug, Default)]
pub(crate) struct TurnState {
    used_tools: Vec<String>,
    used_web_search: bool,
}

/// Outcome of a single completion round.
pub(crate) enum StepOutcome {
    /// Tools were used; the conversation continues with an empty user turn.
    Continue,
    /// The model produced a final answer.
    Final(AgentResponse),
}

/// An agent wrapping a chat-completion capability with conversation history
/// and a fixed tool set.
///
/// Identity and configuration are immutable after construction; only the
/// message history mutates, and only through this type's own methods.
pub struct Agent {
    id: Uuid,
    name: String,
    model: String,
    instructions: Option<String>,
    tools: Vec<Tool>,
    debug: bool,
    backend: Arc<dyn CompletionBackend>,
    messages: Vec<Message>,
}

impl Agent {
    /// Create an agent for the given model and completion backend.
    pub fn new(name: &str, model: &str, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            model: model.to_string(),
            instructions: None,
            tools: Vec::new(),
            debug: false,
            backend,
            messages: Vec::new(),
        }
    }

    /// Set the system instructions. The system message is pinned at the
    /// front of the history and survives [`clear_messages`](Self::clear_messages).
    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        match self.messages.first() {
            Some(m) if m.role == Role::System => self.messages[0] = Message::system(instructions),
            _ => self.messages.insert(0, Message::system(instructions)),
        }
        self
    }

    /// Add one tool. Names must be unique across the agent's tool set;
    /// lookup resolves to the first match.
    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Replace the tool set.
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Surface raw provider responses on returned [`AgentResponse`]s.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Process-unique agent id, generated at construction.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// System instructions, when configured.
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// The conversation history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message to the history.
    ///
    /// Used by the runner to transfer hand-off context; external callers may
    /// also seed history before processing.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove every non-system message, preserving the instruction message
    /// set at construction.
    pub fn clear_messages(&mut self) {
        self.messages.retain(|m| m.role == Role::System);
    }

    /// Send `input` to the model and drive tool calls to a final answer.
    ///
    /// Implemented as an iterative loop: each round appends the user turn
    /// (empty for continuations), performs one completion call, and executes
    /// any requested tools. The loop ends when a response carries no tool
    /// calls. There is no local round ceiling; when driven through an
    /// `AgentRunner`, its `max_iterations` bounds the rounds.
    #[instrument(skip(self, input), fields(agent = %self.name))]
    pub async fn process(&mut self, input: &str) -> Result<AgentResponse> {
        let mut turn = TurnState::default();
        let mut input = input.to_string();

        loop {
            match self.step(&input, &mut turn).await? {
                StepOutcome::Final(response) => return Ok(response),
                StepOutcome::Continue => input.clear(),
            }
        }
    }

    /// One completion round: append the user turn, call the backend, record
    /// the assistant turn, and execute any tool calls.
    pub(crate) async fn step(&mut self, input: &str, turn: &mut TurnState) -> Result<StepOutcome> {
        self.messages.push(Message::user(input));

        let response = self.backend.complete(self.build_request()).await?;
        let raw = response.raw;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| StafettError::Completion("No response from model".to_string()))?;

        let message = choice.message;
        self.messages.push(message.clone());

        let calls = message.tool_calls().to_vec();
        if calls.is_empty() {
            debug!(used_tools = turn.used_tools.len(), "Turn complete");
            return Ok(StepOutcome::Final(AgentResponse {
                message,
                used_tools: std::mem::take(&mut turn.used_tools),
                used_web_search: turn.used_web_search,
                debug: if self.debug { raw } else { None },
            }));
        }

        for call in &calls {
            match call.kind {
                ToolCallKind::Function => {
                    let Some(function) = &call.function else {
                        warn!("Function tool call without a function payload, skipping");
                        continue;
                    };
                    let result = self.dispatch_function(function).await;
                    self.messages
                        .push(Message::function(&function.name, serde_json::to_string(&result)?));
                    turn.used_tools.push(function.name.clone());
                }
                ToolCallKind::WebSearch => {
                    debug!("Model used web search");
                    turn.used_web_search = true;
                }
            }
        }

        Ok(StepOutcome::Continue)
    }

    /// Execute one function call. Argument-parse failures, unknown tools,
    /// and handler errors are all folded into an error payload for the
    /// model; none of them abort the turn.
    async fn dispatch_function(&self, call: &FunctionCall) -> Value {
        info!(tool = %call.name, args = %call.arguments, "Agent calling tool");

        let args: Value = match serde_json::from_str(&call.arguments) {
            Ok(value) => value,
            Err(e) => return json!({"error": format!("Invalid tool arguments: {e}")}),
        };

        let Some(handler) = self.find_handler(&call.name) else {
            return json!({"error": format!("Unknown tool: {}", call.name)});
        };

        match handler(args).await {
            Ok(value) => value,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool handler failed");
                json!({"error": e.to_string()})
            }
        }
    }

    fn find_handler(&self, name: &str) -> Option<ToolHandler> {
        self.tools.iter().find_map(|tool| match tool {
            Tool::Function(f) if f.name == name => Some(f.handler.clone()),
            _ => None,
        })
    }

    fn build_request(&self) -> CompletionRequest {
        let specs: Vec<_> = self.tools.iter().filter_map(Tool::spec).collect();
        let has_tools = !specs.is_empty();

        CompletionRequest {
            model: self.model.clone(),
            messages: self.messages.clone(),
            tools: has_tools.then_some(specs),
            tool_choice: has_tools.then(|| "auto".to_string()),
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.tools.len())
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}
