//! Agent loop with bounded tool-calling rounds.

use super::history::{ConversationHistory, ToolCallRequest};
use super::model::{ChatModel, Completion, CompletionOptions};
use crate::error::Result;
use crate::progress::Progress;
use crate::tools::{TempUnit, ToolDispatcher};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Returned when the model call fails.
pub const FAILED_SENTINEL: &str = "(call failed – see error above)";
/// Returned when the model call exceeds its timeout.
pub const TIMED_OUT_SENTINEL: &str = "(timed out)";
/// Returned when the model answers with empty text.
pub const NO_TEXT_SENTINEL: &str = "(no text)";
/// Returned when the round budget runs out.
pub const ROUND_LIMIT_SENTINEL: &str = "(stopped after too many tool rounds)";

/// Options fixed for the duration of one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOptions {
    pub completion: CompletionOptions,
    /// Unit passed to `get_weather` when the model omits one.
    pub default_unit: TempUnit,
}

/// How a loop run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    Answered,
    ModelFailed(String),
    TimedOut,
    RoundLimit,
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// Final answer text, or one of the sentinels.
    pub content: String,
    /// Model round trips charged to this turn.
    pub rounds: usize,
    pub outcome: LoopOutcome,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Payload returned to the model.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Drives model requests and tool dispatch for one user turn at a time.
pub struct AgentLoop {
    model: Arc<dyn ChatModel>,
    dispatcher: Arc<ToolDispatcher>,
    completion_timeout: Duration,
}

impl AgentLoop {
    pub fn new(
        model: Arc<dyn ChatModel>,
        dispatcher: Arc<ToolDispatcher>,
        completion_timeout: Duration,
    ) -> Self {
        Self {
            model,
            dispatcher,
            completion_timeout,
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Run the loop over `history`, which must already end with the user turn.
    ///
    /// Every tool call of a round is answered, in request order, before the
    /// next model request. Model failure or timeout ends the turn at once.
    pub async fn run(
        &self,
        history: &mut ConversationHistory,
        options: &TurnOptions,
        progress: &dyn Progress,
        max_rounds: usize,
    ) -> Result<AgentResponse> {
        let max_rounds = max_rounds.max(1);
        let mut rounds = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            progress.update("thinking…");
            debug!("Agent round {} of {}", rounds + 1, max_rounds);

            let started = Instant::now();
            let completion = tokio::time::timeout(
                self.completion_timeout,
                self.model.complete(history.turns(), &options.completion),
            )
            .await;
            debug!("Model call took {} ms", started.elapsed().as_millis());

            let completion = match completion {
                Err(_) => {
                    warn!(
                        "Model call timed out after {}s",
                        self.completion_timeout.as_secs()
                    );
                    return Ok(AgentResponse {
                        content: TIMED_OUT_SENTINEL.to_string(),
                        rounds: rounds + 1,
                        outcome: LoopOutcome::TimedOut,
                        tool_calls: tool_calls_made,
                    });
                }
                Ok(Err(e)) => {
                    warn!("Model call failed: {}", e);
                    return Ok(AgentResponse {
                        content: FAILED_SENTINEL.to_string(),
                        rounds: rounds + 1,
                        outcome: LoopOutcome::ModelFailed(e.to_string()),
                        tool_calls: tool_calls_made,
                    });
                }
                Ok(Ok(completion)) => completion,
            };

            match completion {
                Completion::Final { text } => {
                    history.push_assistant(Some(text.clone()), Vec::new());
                    let content = if text.trim().is_empty() {
                        NO_TEXT_SENTINEL.to_string()
                    } else {
                        text
                    };
                    return Ok(AgentResponse {
                        content,
                        rounds: rounds + 1,
                        outcome: LoopOutcome::Answered,
                        tool_calls: tool_calls_made,
                    });
                }
                Completion::ToolCalls { text, mut calls } => {
                    assign_unique_call_ids(&mut calls, rounds + 1);
                    history.push_assistant(text, calls.clone());
                    for call in &calls {
                        let record = self.execute_tool_call(history, call, options, progress).await?;
                        tool_calls_made.push(record);
                    }
                    rounds += 1;
                }
            }

            if rounds >= max_rounds {
                info!("Stopping after {} tool rounds", rounds);
                return Ok(AgentResponse {
                    content: ROUND_LIMIT_SENTINEL.to_string(),
                    rounds,
                    outcome: LoopOutcome::RoundLimit,
                    tool_calls: tool_calls_made,
                });
            }
        }
    }

    /// Execute a single tool call and append its result to history.
    async fn execute_tool_call(
        &self,
        history: &mut ConversationHistory,
        call: &ToolCallRequest,
        options: &TurnOptions,
        progress: &dyn Progress,
    ) -> Result<ToolCallRecord> {
        let result = self
            .dispatcher
            .dispatch(call, options.default_unit, progress)
            .await;
        history.push_tool_result(&result)?;

        Ok(ToolCallRecord {
            name: call.tool_name.clone(),
            arguments: call.raw_arguments.clone(),
            result: result.content(),
        })
    }
}

/// Replace blank or repeated call ids so every call in a round has its own.
fn assign_unique_call_ids(calls: &mut [ToolCallRequest], round: usize) {
    let mut seen = HashSet::new();
    for (index, call) in calls.iter_mut().enumerate() {
        if call.call_id.trim().is_empty() || seen.contains(&call.call_id) {
            let mut replacement = format!("call_{}_{}", round, index);
            while seen.contains(&replacement) {
                replacement.push('_');
            }
            debug!("Reassigned tool call id {:?} to {}", call.call_id, replacement);
            call.call_id = replacement;
        }
        seen.insert(call.call_id.clone());
    }
}
