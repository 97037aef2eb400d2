//! Chat-completion capability abstraction.
//!
//! Agents talk to an abstract [`CompletionBackend`] rather than a concrete
//! provider; the backend and its credentials are injected at construction.

mod openai;

pub use openai::OpenAIBackend;

use crate::agent::{Message, ToolSpec};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One assembled chat-completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Serialized tool definitions; omitted when the agent has no tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

/// One returned assistant choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Message,
}

/// Response from the completion capability.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
    /// Full provider response body, kept for debug surfacing.
    #[serde(skip)]
    pub raw: Option<Value>,
}

/// An asynchronous chat-completion capability.
///
/// Implementations accept an OpenAI-style request shape and return one
/// assistant message plus optional tool-call requests. Failures reject with
/// a human-readable message; nothing in this crate retries them.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend for exercising agents without a network.

    use super::*;
    use crate::agent::{FunctionCall, Role, ToolCallKind, ToolCallRequest};
    use crate::error::StafettError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) enum Reply {
        Ok(CompletionResponse),
        /// Resolve successfully after a delay.
        Delayed(Duration, CompletionResponse),
        Err(String),
    }

    /// Backend that replays a fixed sequence of replies and records every
    /// request it receives.
    pub(crate) struct ScriptedBackend {
        replies: Mutex<VecDeque<Reply>>,
        pub(crate) requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedBackend {
        pub(crate) fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted backend exhausted");
            match reply {
                Reply::Ok(response) => Ok(response),
                Reply::Delayed(delay, response) => {
                    tokio::time::sleep(delay).await;
                    Ok(response)
                }
                Reply::Err(message) => Err(StafettError::Completion(message)),
            }
        }
    }

    /// A plain assistant reply with no tool calls.
    pub(crate) fn assistant_reply(content: &str) -> CompletionResponse {
        response_with(Message::assistant(content))
    }

    /// An assistant reply requesting one function call.
    pub(crate) fn tool_call_reply(name: &str, arguments: &str) -> CompletionResponse {
        let mut message = Message::assistant("");
        message.tool_calls = Some(vec![ToolCallRequest {
            id: Some(format!("call_{name}")),
            kind: ToolCallKind::Function,
            function: Some(FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            }),
        }]);
        response_with(message)
    }

    /// An assistant reply requesting a web search.
    pub(crate) fn web_search_reply() -> CompletionResponse {
        let mut message = Message::assistant("");
        message.tool_calls = Some(vec![ToolCallRequest {
            id: None,
            kind: ToolCallKind::WebSearch,
            function: None,
        }]);
        response_with(message)
    }

    pub(crate) fn response_with(message: Message) -> CompletionResponse {
        assert_eq!(message.role, Role::Assistant);
        CompletionResponse {
            choices: vec![Choice { message }],
            raw: None,
        }
    }
}
