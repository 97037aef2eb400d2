//! Stafett - Multi-agent LLM orchestration
//!
//! A runtime for tool-calling LLM agents with multi-agent hand-off.
//! The name "Stafett" is the Norwegian word for a relay race: when one
//! agent's answer matches a hand-off rule, the conversation baton passes
//! to the next agent.
//!
//! # Overview
//!
//! Stafett lets you:
//! - Wrap any OpenAI-compatible completion API behind one backend trait
//! - Give agents typed function tools executed locally, or a web-search flag
//! - Chain agents with ordered hand-off rules, an iteration ceiling, and a
//!   run-wide timeout
//! - Serve the runtime over HTTP or drive it from the CLI
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `agent` - Agents, tools, messages, and the runner
//! - `completion` - Completion capability trait and the OpenAI backend
//! - `audio` - Speech synthesis for the generate_audio tool
//! - `config` - Configuration management
//! - `cli` - Command-line interface and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use stafett::agent::{Agent, AgentRunner};
//! use stafett::completion::OpenAIBackend;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = Arc::new(OpenAIBackend::new("https://api.openai.com/v1", "sk-...")?);
//!
//!     let agent = Agent::new("helper", "gpt-4o-mini", backend)
//!         .with_instructions("You are a helper");
//!
//!     let mut runner = AgentRunner::new();
//!     runner.register_agent(agent, true);
//!
//!     let response = runner.run("Say hello", None).await?;
//!     println!("{}", response.message.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod audio;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;

pub use error::{Result, StafettError};
