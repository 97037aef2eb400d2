//! Agent orchestration runtime.
//!
//! An [`Agent`] wraps a chat-completion capability with conversation
//! history and a tool set; an [`AgentRunner`] sequences agents, applies a
//! run-wide timeout, and transfers the conversation between agents when a
//! hand-off rule matches.

mod agent;
mod message;
mod runner;
mod tools;

pub use agent::{Agent, AgentResponse};
pub use message::{FunctionCall, Message, Role, ToolCallKind, ToolCallRequest};
pub use runner::{AgentRunner, Handoff, HandoffCondition, RunnerConfig};
pub use tools::{
    FunctionParameter, FunctionSpec, FunctionTool, ParameterKind, SearchContextSize, Tool,
    ToolHandler, ToolSpec, WebSearchTool,
};
