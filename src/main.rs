//! AgentDesk CLI entry point.

use agentdesk::cli::{commands, Cli, Commands};
use agentdesk::config::Settings;
use agentdesk::progress::SpinnerAwareWriter;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("agentdesk={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(SpinnerAwareWriter),
        )
        .init();

    // Execute command
    match cli.command.unwrap_or(Commands::Chat { model: None }) {
        Commands::Chat { model } => {
            commands::run_chat(model, settings).await?;
        }

        Commands::Ask {
            question,
            model,
            max_rounds,
        } => {
            commands::run_ask(&question, model, max_rounds, settings).await?;
        }

        Commands::Tools { json } => {
            commands::run_tools(json, &settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, &config_path)?;
        }
    }

    Ok(())
}
