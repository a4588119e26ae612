//! Interactive chat command with tool calling support.

use crate::agent::{AgentResponse, CommandOutcome, LoopOutcome, SessionCommand, SessionState};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::progress::Spinner;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing::debug;

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, mut settings: Settings) -> Result<()> {
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

    Output::banner(&orchestrator.settings().model.deployment);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("you>").cyan().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match SessionCommand::parse(input) {
                Ok(command) => match session.apply(command) {
                    CommandOutcome::Exit => break,
                    CommandOutcome::Notice(notice) => Output::warning(&notice),
                },
                Err(usage) => Output::error(&usage),
            }
            continue;
        }

        if let Err(e) = run_turn(&orchestrator, &mut session, input, None).await {
            Output::error(&format!("Error: {}", e));
        }
    }

    Ok(())
}

/// Run one user turn with a live spinner and print the answer.
pub(super) async fn run_turn(
    orchestrator: &Orchestrator,
    session: &mut SessionState,
    input: &str,
    max_rounds: Option<usize>,
) -> Result<AgentResponse> {
    session.begin_turn(input);
    let options = session.turn_options(orchestrator.registry());
    let max_rounds = max_rounds.unwrap_or(session.max_tool_rounds());

    let spinner = Spinner::start("thinking…");
    let started = Instant::now();
    let result = orchestrator
        .agent()
        .run(session.history_mut(), &options, &spinner, max_rounds)
        .await;

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            spinner.finish(None).await;
            return Err(e.into());
        }
    };

    spinner
        .finish(Some(&format!(
            "done in {} ms (round trips: {})",
            started.elapsed().as_millis(),
            response.rounds
        )))
        .await;

    for call in &response.tool_calls {
        debug!("{} -> {}", call, call.result);
    }
    if let LoopOutcome::ModelFailed(message) = &response.outcome {
        Output::error(message);
    }
    Output::assistant(&response.content);

    Ok(response)
}
