//! Ask command implementation.

use super::chat::run_turn;
use crate::agent::LoopOutcome;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::{bail, Result};

/// Run the ask command: one user turn, then exit.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    max_rounds: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(model) = model {
        settings.model.deployment = model;
    }

    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'agentdesk doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let mut session = orchestrator.new_session();

    let response = run_turn(&orchestrator, &mut session, question, max_rounds).await?;

    match response.outcome {
        LoopOutcome::Answered | LoopOutcome::RoundLimit => Ok(()),
        LoopOutcome::ModelFailed(message) => bail!("model call failed: {}", message),
        LoopOutcome::TimedOut => bail!(
            "model call timed out after {}s",
            orchestrator.settings().model.timeout_seconds
        ),
    }
}
