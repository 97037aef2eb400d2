//! Error types for Stafett.

use thiserror::Error;

/// Library-level error type for Stafett operations.
#[derive(Error, Debug)]
pub enum StafettError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Completion API error: {0}")]
    Completion(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("No agent specified and no default agent registered")]
    NoStartAgent,

    #[error("Agent run exceeded maximum iterations ({0})")]
    IterationLimit(usize),

    #[error("Agent run timed out after {0} ms")]
    Timeout(u64),

    #[error("Audio synthesis failed: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Stafett operations.
pub type Result<T> = std::result::Result<T, StafettError>;
