//! CLI module for Stafett.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Stafett - Multi-agent LLM orchestration
///
/// Run tool-calling agents against any OpenAI-compatible completion API,
/// with multi-agent hand-off. The name "Stafett" is the Norwegian word for
/// a relay race.
#[derive(Parser, Debug)]
#[command(name = "stafett")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session with a tool-calling agent
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Let the model use web search
        #[arg(long)]
        web_search: bool,

        /// Print raw provider responses
        #[arg(long)]
        debug: bool,
    },

    /// Run a single prompt through the agent runner and print the response
    Run {
        /// The prompt to process
        prompt: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Let the model use web search
        #[arg(long)]
        web_search: bool,

        /// Print raw provider responses
        #[arg(long)]
        debug: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. "completion.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
