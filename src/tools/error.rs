//! Structured tool failures.
//!
//! Every variant serializes to `{"error": "<kind>", ...context}` and is sent
//! back to the model as the tool result, so the conversation can continue.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A tool failure reported to the model instead of being raised.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ToolError {
    #[error("missing required 'location' argument")]
    MissingLocation,

    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("bad tool arguments: {message}")]
    BadArguments { message: String },

    #[error("tool failed: {message}")]
    ToolException { message: String },

    #[error("no image model configured")]
    ImageNotConfigured,

    #[error("no speech model configured")]
    SpeechNotConfigured,

    #[error("no API key available for speech")]
    NoApiKeyForSpeech,

    #[error("speech request failed with status {status}")]
    SpeechFailed { status: u16, body: String },

    #[error("speech request failed: {message}")]
    SpeechException { message: String },

    #[error("no video model configured")]
    VideoNotConfigured,

    #[error("no API key available for video")]
    NoApiKeyForVideo,

    #[error("video job creation failed with status {status}")]
    VideoCreateFailed { status: u16, body: String },

    #[error("video job response had no id")]
    MissingJobId { body: String },

    #[error("video job status request failed with status {status}")]
    StatusFailed { status: u16, body: String },

    #[error("video job {job} finished as {final_status}")]
    JobNotSucceeded {
        job: String,
        #[serde(rename = "finalStatus")]
        final_status: String,
        #[serde(rename = "lastStatus", skip_serializing_if = "Option::is_none")]
        last_status: Option<String>,
    },

    #[error("video job {job} succeeded without generations")]
    NoGenerations { job: String },

    #[error("video job {job} generation has no id")]
    MissingGenerationId { job: String },

    #[error("video download failed with status {status}")]
    VideoDownloadFailed { status: u16, body: String },

    #[error("video generation failed: {message}")]
    VideoException { message: String },
}

impl ToolError {
    /// Machine-readable kind, identical to the payload's `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::MissingLocation => "missing_location",
            ToolError::UnknownTool { .. } => "unknown_tool",
            ToolError::BadArguments { .. } => "bad_arguments",
            ToolError::ToolException { .. } => "tool_exception",
            ToolError::ImageNotConfigured => "image_not_configured",
            ToolError::SpeechNotConfigured => "speech_not_configured",
            ToolError::NoApiKeyForSpeech => "no_api_key_for_speech",
            ToolError::SpeechFailed { .. } => "speech_failed",
            ToolError::SpeechException { .. } => "speech_exception",
            ToolError::VideoNotConfigured => "video_not_configured",
            ToolError::NoApiKeyForVideo => "no_api_key_for_video",
            ToolError::VideoCreateFailed { .. } => "video_create_failed",
            ToolError::MissingJobId { .. } => "missing_job_id",
            ToolError::StatusFailed { .. } => "status_failed",
            ToolError::JobNotSucceeded { .. } => "job_not_succeeded",
            ToolError::NoGenerations { .. } => "no_generations",
            ToolError::MissingGenerationId { .. } => "missing_generation_id",
            ToolError::VideoDownloadFailed { .. } => "video_download_failed",
            ToolError::VideoException { .. } => "video_exception",
        }
    }

    /// Structured payload sent back to the model.
    pub fn payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "error": self.kind(), "message": self.to_string() })
        })
    }

    pub fn bad_arguments(message: impl Into<String>) -> Self {
        ToolError::BadArguments {
            message: message.into(),
        }
    }

    pub fn exception(message: impl std::fmt::Display) -> Self {
        ToolError::ToolException {
            message: message.to_string(),
        }
    }
}
