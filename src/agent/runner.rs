//! Agent runner: sequencing, hand-off, and run-wide limits.

use super::agent::{Agent, AgentResponse, StepOutcome, TurnState};
use super::message::Message;
use crate::error::{Result, StafettError};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Predicate deciding whether a response message triggers a hand-off.
pub type HandoffCondition = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// A hand-off rule: when `condition` matches a response message, the
/// conversation transfers to the agent with `agent_id`.
#[derive(Clone)]
pub struct Handoff {
    pub agent_id: Uuid,
    condition: HandoffCondition,
}

impl Handoff {
    /// Create a rule from an arbitrary predicate.
    pub fn new<F>(agent_id: Uuid, condition: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        Self {
            agent_id,
            condition: Arc::new(condition),
        }
    }

    /// Create a rule that matches when the message content matches `pattern`.
    pub fn when_content_matches(agent_id: Uuid, pattern: Regex) -> Self {
        Self::new(agent_id, move |message| pattern.is_match(&message.content))
    }

    fn matches(&self, message: &Message) -> bool {
        (self.condition)(message)
    }
}

impl std::fmt::Debug for Handoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handoff")
            .field("agent_id", &self.agent_id)
            .finish_non_exhaustive()
    }
}

/// Limits applied to one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Ceiling on completion rounds (tool continuations and hand-offs
    /// combined) before the run is aborted.
    pub max_iterations: usize,
    /// Wall-clock budget for the entire run; not reset on hand-off.
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            timeout: Duration::from_millis(30_000),
        }
    }
}

/// Drives registered agents to a final response, transferring the
/// conversation between agents when a hand-off rule matches.
///
/// Constructed once per top-level request and discarded after `run`.
#[derive(Debug, Default)]
pub struct AgentRunner {
    agents: HashMap<Uuid, Agent>,
    handoffs: Vec<Handoff>,
    default_agent: Option<Uuid>,
    config: RunnerConfig,
}

impl AgentRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            agents: HashMap::new(),
            handoffs: Vec::new(),
            default_agent: None,
            config,
        }
    }

    /// Register an agent, returning its id. A later `is_default`
    /// registration overwrites any earlier default.
    pub fn register_agent(&mut self, agent: Agent, is_default: bool) -> Uuid {
        let id = agent.id();
        if is_default {
            self.default_agent = Some(id);
        }
        self.agents.insert(id, agent);
        id
    }

    /// Append a hand-off rule. Rules are evaluated in registration order;
    /// the first match wins.
    pub fn register_handoff(&mut self, handoff: Handoff) {
        self.handoffs.push(handoff);
    }

    /// Look up a registered agent.
    pub fn agent(&self, id: Uuid) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Run the orchestration loop starting from `start_agent` (or the
    /// default agent when `None`).
    ///
    /// A single timeout spans the whole run; on expiry the in-flight
    /// completion future is dropped and the run rejects with
    /// [`StafettError::Timeout`].
    pub async fn run(&mut self, input: &str, start_agent: Option<Uuid>) -> Result<AgentResponse> {
        let start = start_agent
            .or(self.default_agent)
            .ok_or(StafettError::NoStartAgent)?;
        if !self.agents.contains_key(&start) {
            return Err(StafettError::AgentNotFound(start.to_string()));
        }

        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, self.run_loop(input, start)).await {
            Ok(result) => result,
            Err(_) => Err(StafettError::Timeout(timeout.as_millis() as u64)),
        }
    }

    async fn run_loop(&mut self, input: &str, start: Uuid) -> Result<AgentResponse> {
        let mut current = start;
        let mut input = input.to_string();
        let mut turn = TurnState::default();

        for iteration in 1..=self.config.max_iterations {
            let agent = self
                .agents
                .get_mut(&current)
                .ok_or_else(|| StafettError::AgentNotFound(current.to_string()))?;
            debug!(iteration, agent = %agent.name(), "Runner iteration");

            match agent.step(&input, &mut turn).await? {
                StepOutcome::Continue => input.clear(),
                StepOutcome::Final(response) => {
                    let Some(target) = self
                        .handoffs
                        .iter()
                        .find(|h| h.matches(&response.message))
                        .map(|h| h.agent_id)
                    else {
                        return Ok(response);
                    };

                    let next = self
                        .agents
                        .get_mut(&target)
                        .ok_or_else(|| StafettError::AgentNotFound(target.to_string()))?;
                    info!(to = %next.name(), "Handing off conversation");

                    // The receiving agent sees the previous agent's answer
                    // as a fresh user turn, then continues with no new input.
                    next.add_message(Message::user(response.message.content.clone()));
                    current = target;
                    input.clear();
                    turn = TurnState::default();
                }
            }
        }

        Err(StafettError::IterationLimit(self.config.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::Role;
    use crate::agent::tools::Tool;
    use crate::completion::testing::{assistant_reply, tool_call_reply, Reply, ScriptedBackend};
    use serde_json::json;

    fn noop_tool() -> Tool {
        Tool::function("noop", "Does nothing", vec![], |_args| async {
            Ok(json!({"ok": true}))
        })
    }

    #[tokio::test]
    async fn test_run_uses_default_agent() {
        let backend = Arc::new(ScriptedBackend::new(vec![Reply::Ok(assistant_reply("hi"))]));
        let mut runner = AgentRunner::new();
        runner.register_agent(Agent::new("A", "gpt-4o-mini", backend), true);

        let response = runner.run("hello", None).await.unwrap();
        assert_eq!(response.message.content, "hi");
    }

    #[tokio::test]
    async fn test_run_without_start_or_default_fails() {
        let mut runner = AgentRunner::new();
        let err = runner.run("hello", None).await.unwrap_err();
        assert!(matches!(err, StafettError::NoStartAgent));
    }

    #[tokio::test]
    async fn test_run_with_unknown_start_agent_fails() {
        let mut runner = AgentRunner::new();
        let err = runner.run("hello", Some(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, StafettError::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn test_later_default_overwrites_earlier() {
        let backend = Arc::new(ScriptedBackend::new(vec![Reply::Ok(assistant_reply("from b"))]));
        let mut runner = AgentRunner::new();
        runner.register_agent(Agent::new("A", "gpt-4o-mini", backend.clone()), true);
        runner.register_agent(Agent::new("B", "gpt-4o-mini", backend), true);

        let response = runner.run("hello", None).await.unwrap();
        assert_eq!(response.message.content, "from b");
    }

    #[tokio::test]
    async fn test_first_matching_handoff_wins() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Reply::Ok(assistant_reply("please route this elsewhere")),
            Reply::Ok(assistant_reply("handled by first target")),
        ]));

        let mut runner = AgentRunner::new();
        let triage = runner.register_agent(Agent::new("Triage", "gpt-4o-mini", backend.clone()), true);
        let first = runner.register_agent(Agent::new("First", "gpt-4o-mini", backend.clone()), false);
        let second = runner.register_agent(Agent::new("Second", "gpt-4o-mini", backend), false);

        // Both conditions match the triage response; registration order decides.
        runner.register_handoff(Handoff::new(first, |m| m.content.contains("route")));
        runner.register_handoff(Handoff::new(second, |m| m.content.contains("route")));

        let response = runner.run("help", Some(triage)).await.unwrap();
        assert_eq!(response.message.content, "handled by first target");

        // The second target never saw the conversation.
        assert!(runner.agent(second).unwrap().messages().is_empty());
    }

    #[tokio::test]
    async fn test_handoff_transfers_content_as_user_message() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Reply::Ok(assistant_reply("escalate: user needs billing")),
            Reply::Ok(assistant_reply("billing sorted")),
        ]));

        let mut runner = AgentRunner::new();
        let triage = runner.register_agent(Agent::new("Triage", "gpt-4o-mini", backend.clone()), true);
        let billing = runner.register_agent(Agent::new("Billing", "gpt-4o-mini", backend), false);
        runner.register_handoff(Handoff::when_content_matches(
            billing,
            Regex::new(r"^escalate:").unwrap(),
        ));

        let response = runner.run("I was double charged", Some(triage)).await.unwrap();
        assert_eq!(response.message.content, "billing sorted");

        let history = runner.agent(billing).unwrap().messages();
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "escalate: user needs billing");
        // Continuation turn carries no new user content.
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[1].content, "");
        assert_eq!(history[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_handoff_to_unregistered_agent_fails() {
        let backend = Arc::new(ScriptedBackend::new(vec![Reply::Ok(assistant_reply("route me"))]));
        let mut runner = AgentRunner::new();
        runner.register_agent(Agent::new("A", "gpt-4o-mini", backend), true);
        runner.register_handoff(Handoff::new(Uuid::new_v4(), |_| true));

        let err = runner.run("hello", None).await.unwrap_err();
        assert!(matches!(err, StafettError::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn test_iteration_ceiling_counts_tool_rounds() {
        // The model never stops calling tools; the ceiling must trip after
        // exactly three completion rounds.
        let backend = Arc::new(ScriptedBackend::new(vec![
            Reply::Ok(tool_call_reply("noop", "{}")),
            Reply::Ok(tool_call_reply("noop", "{}")),
            Reply::Ok(tool_call_reply("noop", "{}")),
            Reply::Ok(tool_call_reply("noop", "{}")),
        ]));

        let mut runner = AgentRunner::with_config(RunnerConfig {
            max_iterations: 3,
            timeout: Duration::from_secs(5),
        });
        runner.register_agent(
            Agent::new("Loop", "gpt-4o-mini", backend.clone()).with_tool(noop_tool()),
            true,
        );

        let err = runner.run("go", None).await.unwrap_err();
        assert!(matches!(err, StafettError::IterationLimit(3)));
        assert_eq!(backend.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_spans_the_whole_run() {
        // 30 ms to the hand-off, then a 40 ms second call: 70 ms aggregate
        // against a 50 ms budget. The timer is armed once, not per agent.
        let backend = Arc::new(ScriptedBackend::new(vec![
            Reply::Delayed(Duration::from_millis(30), assistant_reply("escalate now")),
            Reply::Delayed(Duration::from_millis(40), assistant_reply("too late")),
        ]));

        let mut runner = AgentRunner::with_config(RunnerConfig {
            max_iterations: 10,
            timeout: Duration::from_millis(50),
        });
        let a = runner.register_agent(Agent::new("A", "gpt-4o-mini", backend.clone()), true);
        let b = runner.register_agent(Agent::new("B", "gpt-4o-mini", backend), false);
        runner.register_handoff(Handoff::new(b, |m| m.content.contains("escalate")));

        let err = runner.run("hello", Some(a)).await.unwrap_err();
        assert!(matches!(err, StafettError::Timeout(50)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_within_timeout_succeeds() {
        let backend = Arc::new(ScriptedBackend::new(vec![Reply::Delayed(
            Duration::from_millis(30),
            assistant_reply("quick enough"),
        )]));

        let mut runner = AgentRunner::with_config(RunnerConfig {
            max_iterations: 10,
            timeout: Duration::from_millis(50),
        });
        runner.register_agent(Agent::new("A", "gpt-4o-mini", backend), true);

        let response = runner.run("hello", None).await.unwrap();
        assert_eq!(response.message.content, "quick enough");
    }
}
