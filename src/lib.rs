//! AgentDesk - a terminal research assistant that calls tools
//!
//! Wraps a chat model in a bounded tool-calling loop. The model can ask for
//! KPI definitions, current weather, images, spoken narration and short video
//! clips; every tool outcome, including failures, is fed back into the
//! conversation as structured JSON.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `agent` - Conversation history, model boundary and the agent loop
//! - `tools` - Tool schemas, argument parsing and dispatch
//! - `jobs` - Long-running video job state machine and client
//! - `progress` - Concurrent status spinner
//! - `artifacts` - Timestamped output files
//! - `orchestrator` - Wiring from settings to a ready agent
//!
//! # Example
//!
//! ```rust,no_run
//! use agentdesk::config::Settings;
//! use agentdesk::orchestrator::Orchestrator;
//! use agentdesk::progress::NoProgress;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!     let mut session = orchestrator.new_session();
//!
//!     session.begin_turn("What is NPS?");
//!     let options = session.turn_options(orchestrator.registry());
//!     let response = orchestrator
//!         .agent()
//!         .run(session.history_mut(), &options, &NoProgress, 4)
//!         .await?;
//!     println!("{} (round trips: {})", response.content, response.rounds);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod openai;
pub mod orchestrator;
pub mod progress;
pub mod tools;

pub use error::{AgentDeskError, Result};
