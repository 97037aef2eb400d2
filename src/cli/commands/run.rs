//! One-shot run command.

use crate::agent::{Agent, AgentRunner, Tool};
use crate::cli::Output;
use crate::config::Settings;

/// Default instructions for the one-shot agent.
const RUN_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Complete the user's request in one response.";

/// Run a single prompt through the agent runner.
pub async fn run_once(
    prompt: &str,
    model: Option<String>,
    web_search: bool,
    debug: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    let backend = super::build_backend(&settings)?;
    let model = model.unwrap_or_else(|| settings.completion.model.clone());

    let mut agent = Agent::new("assistant", &model, backend)
        .with_instructions(RUN_SYSTEM_PROMPT)
        .with_debug(debug);
    if web_search {
        agent = agent.with_tool(Tool::web_search());
    }

    let mut runner = AgentRunner::with_config(settings.runner.to_config());
    runner.register_agent(agent, true);

    match runner.run(prompt, None).await {
        Ok(response) => {
            println!("\n{}\n", response.message.content);

            if !response.used_tools.is_empty() {
                Output::header(&format!("Tools used ({})", response.used_tools.len()));
                for name in &response.used_tools {
                    Output::tool_call(name);
                }
                println!();
            }
            if response.used_web_search {
                Output::info("Web search was used.");
            }
            if let Some(raw) = &response.debug {
                Output::header("Raw response");
                println!("{}", serde_json::to_string_pretty(raw)?);
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Run failed: {}", e));
            Err(e.into())
        }
    }
}
