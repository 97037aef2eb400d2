//! Interactive chat command.

use crate::agent::{Agent, Tool};
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, BufRead, Write};

/// System prompt for the interactive chat agent.
const CHAT_SYSTEM_PROMPT: &str = r#"You are a helpful assistant.

Answer clearly and concisely. When a tool is available and would improve
your answer, use it. Remember context from earlier in the conversation."#;

/// Run the interactive chat command.
pub async fn run_chat(
    model: Option<String>,
    web_search: bool,
    debug: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    let backend = super::build_backend(&settings)?;
    let model = model.unwrap_or_else(|| settings.completion.model.clone());

    let mut agent = Agent::new("chat", &model, backend)
        .with_instructions(CHAT_SYSTEM_PROMPT)
        .with_debug(debug);
    if web_search {
        agent = agent.with_tool(Tool::web_search());
    }

    println!("\n{}", style("Stafett Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        stdin.lock().read_line(&mut input)?;

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            agent.clear_messages();
            Output::info("Conversation history cleared.");
            continue;
        }

        match agent.process(input).await {
            Ok(response) => {
                for name in &response.used_tools {
                    Output::tool_call(name);
                }
                if response.used_web_search {
                    Output::tool_call("web_search");
                }
                println!(
                    "\n{} {}\n",
                    style("Stafett:").cyan().bold(),
                    response.message.content
                );
                if let Some(raw) = &response.debug {
                    println!("{}", Output::dim_style().apply_to(raw.to_string()));
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
