//! CLI module for AgentDesk.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// AgentDesk - a terminal research assistant that calls tools
///
/// Chats with an OpenAI-compatible deployment that can look up KPI
/// definitions, check the weather, and generate images, narration and video.
#[derive(Parser, Debug)]
#[command(name = "agentdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Command to run (defaults to an interactive chat)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Deployment to use instead of model.deployment
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,

        /// Deployment to use instead of model.deployment
        #[arg(short, long)]
        model: Option<String>,

        /// Override the tool round budget for this question
        #[arg(long)]
        max_rounds: Option<usize>,
    },

    /// List the tools that would be offered to the model
    Tools {
        /// Print full JSON schemas
        #[arg(long)]
        json: bool,
    },

    /// Check configuration and connectivity prerequisites
    Doctor,

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

    /// Show configuration file path
    Path,
}
