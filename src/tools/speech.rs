//! Text-to-speech via the `audio/speech` endpoint.

use super::error::ToolError;
use crate::artifacts;
use crate::config::Settings;
use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Connection parameters for speech synthesis.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Full `.../openai/v1/audio/speech` URL.
    pub url: Url,
    pub api_key: Option<String>,
    pub model: String,
    pub voice: String,
    pub format: String,
    pub timeout: Duration,
    pub output_dir: PathBuf,
}

impl SpeechConfig {
    /// Build from settings. `Ok(None)` when no speech model is configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(model) = settings
            .speech
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            url: settings.inference_base()?.join("audio/speech")?,
            api_key: settings.model.api_key.clone(),
            model,
            voice: settings.speech.voice.clone(),
            format: settings.speech.format.clone(),
            timeout: Duration::from_secs(settings.speech.timeout_seconds),
            output_dir: settings.output_dir(),
        }))
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Speech synthesis client that saves narration to disk.
pub struct SpeechClient {
    http: reqwest::Client,
    config: SpeechConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Narrate `text` and return `{audio, source}`.
    #[instrument(skip(self, text), fields(model = %self.config.model))]
    pub async fn narrate(&self, text: &str) -> std::result::Result<Value, ToolError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ToolError::NoApiKeyForSpeech)?;

        let request = SpeechRequest {
            model: &self.config.model,
            voice: &self.config.voice,
            input: text,
            response_format: &self.config.format,
        };

        let response = self
            .http
            .post(self.config.url.clone())
            .header("api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(speech_exception)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::SpeechFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(speech_exception)?;
        let path = artifacts::timestamped_path(&self.config.output_dir, "narration", &self.config.format);
        artifacts::write_bytes(&path, &bytes)
            .await
            .map_err(speech_exception)?;
        info!("Saved narration to {}", path.display());

        Ok(json!({
            "audio": path.display().to_string(),
            "source": self.config.model
        }))
    }
}

fn speech_exception(err: impl std::fmt::Display) -> ToolError {
    ToolError::SpeechException {
        message: err.to_string(),
    }
}
