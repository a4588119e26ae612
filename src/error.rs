//! Error types for AgentDesk.

use thiserror::Error;

/// Library-level error type for AgentDesk operations.
///
/// Tool failures are not represented here: they travel back to the model as
/// [`ToolError`](crate::tools::ToolError) payloads instead.
#[derive(Error, Debug)]
pub enum AgentDeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Weather lookup failed: {0}")]
    Weather(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for AgentDesk operations.
pub type Result<T> = std::result::Result<T, AgentDeskError>;
