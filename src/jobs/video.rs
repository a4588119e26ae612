//! Video generation over the create → poll → fetch job protocol.

use super::state::{JobState, PollEvent, StatusDocument};
use crate::artifacts;
use crate::config::Settings;
use crate::error::{AgentDeskError, Result};
use crate::progress::Progress;
use crate::tools::{clamp_duration, ToolError};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Connection and pacing parameters for video jobs.
#[derive(Debug, Clone)]
pub struct VideoJobConfig {
    /// Base URL ending in `/openai/v1/`.
    pub base_url: Url,
    pub api_key: Option<String>,
    pub api_version: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub default_duration: u32,
    pub poll_interval: Duration,
    pub poll_deadline: Duration,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
}

impl VideoJobConfig {
    /// Build from settings. `Ok(None)` when no video model is configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(model) = settings
            .video
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            base_url: settings.video_base()?,
            api_key: settings.video.api_key.clone(),
            api_version: settings.video.api_version.clone(),
            model,
            width: settings.video.width,
            height: settings.video.height,
            default_duration: settings.video.default_duration_seconds,
            poll_interval: settings.video.poll_interval(),
            poll_deadline: settings.video.poll_deadline(),
            request_timeout: settings.video.request_timeout(),
            output_dir: settings.output_dir(),
        }))
    }
}

#[derive(Debug, Serialize)]
struct CreateJobRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    n_seconds: u32,
    model: &'a str,
}

/// Client for the asynchronous video generation service.
pub struct VideoJobClient {
    http: reqwest::Client,
    config: VideoJobConfig,
}

impl VideoJobClient {
    pub fn new(config: VideoJobConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Run a job end to end and save the result.
    ///
    /// Every failure comes back as a [`ToolError`] carrying enough context
    /// (status code, body, job id) to diagnose without server access.
    #[instrument(skip(self, prompt, progress), fields(model = %self.config.model))]
    pub async fn generate(
        &self,
        prompt: &str,
        duration_seconds: Option<u32>,
        progress: &dyn Progress,
    ) -> std::result::Result<Value, ToolError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ToolError::NoApiKeyForVideo)?;
        let duration =
            clamp_duration(duration_seconds.unwrap_or(self.config.default_duration) as i64);

        progress.update("creating video job…");
        let job_id = self.create_job(api_key, prompt, duration).await?;
        info!("Created video job {}", job_id);

        progress.update(&format!("job {} created; polling…", job_id));
        let state = self.poll_until_terminal(api_key, job_id, progress).await?;
        let job_id = state.job_id().to_string();
        let generation_id = state.into_generation_id()?;

        progress.update("downloading video content…");
        let bytes = self.download(api_key, &generation_id).await?;

        let saved = artifacts::save_video(&self.config.output_dir, prompt, &bytes)
            .await
            .map_err(video_exception)?;
        info!("Saved video to {}", saved.video.display());

        Ok(json!({
            "video": saved.video.display().to_string(),
            "playground": saved.playground.display().to_string(),
            "job": job_id,
            "generation": generation_id,
            "model": self.config.model,
            "width": self.config.width,
            "height": self.config.height,
            "duration": duration
        }))
    }

    async fn create_job(
        &self,
        api_key: &str,
        prompt: &str,
        duration: u32,
    ) -> std::result::Result<String, ToolError> {
        let url = self.endpoint("video/generations/jobs").map_err(video_exception)?;
        let payload = CreateJobRequest {
            prompt,
            width: self.config.width,
            height: self.config.height,
            n_seconds: duration,
            model: &self.config.model,
        };

        let (status, body) = read_text(self.authorized(self.http.post(url), api_key).json(&payload))
            .await
            .map_err(video_exception)?;
        if !status.is_success() {
            return Err(ToolError::VideoCreateFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|doc| doc.get("id").and_then(Value::as_str).map(str::to_string))
            .filter(|id| !id.trim().is_empty())
            .ok_or(ToolError::MissingJobId { body })
    }

    /// Poll until the job reaches a terminal state or the deadline passes.
    async fn poll_until_terminal(
        &self,
        api_key: &str,
        job_id: String,
        progress: &dyn Progress,
    ) -> std::result::Result<JobState, ToolError> {
        let deadline = Instant::now() + self.config.poll_deadline;
        let mut state = JobState::created(job_id);

        while !state.is_terminal() {
            if Instant::now() >= deadline {
                warn!("Video job {} hit the poll deadline", state.job_id());
                state = state.apply(PollEvent::DeadlineElapsed);
                break;
            }

            tokio::time::sleep(self.config.poll_interval).await;
            progress.update(&format!("polling job {}…", state.job_id()));

            let document = self.fetch_status(api_key, state.job_id()).await?;
            debug!("Job {} status {:?}", state.job_id(), document.status);
            state = state.apply(PollEvent::Observed(document));
        }

        Ok(state)
    }

    async fn fetch_status(
        &self,
        api_key: &str,
        job_id: &str,
    ) -> std::result::Result<StatusDocument, ToolError> {
        let url = self
            .endpoint(&format!("video/generations/jobs/{}", job_id))
            .map_err(video_exception)?;

        let (status, body) = read_text(self.authorized(self.http.get(url), api_key))
            .await
            .map_err(video_exception)?;
        if !status.is_success() {
            return Err(ToolError::StatusFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(video_exception)
    }

    async fn download(
        &self,
        api_key: &str,
        generation_id: &str,
    ) -> std::result::Result<Vec<u8>, ToolError> {
        let url = self
            .endpoint(&format!("video/generations/{}/content/video", generation_id))
            .map_err(video_exception)?;

        let response = self
            .authorized(self.http.get(url), api_key)
            .send()
            .await
            .map_err(video_exception)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::VideoDownloadFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(video_exception)?;
        Ok(bytes.to_vec())
    }

    /// `{base}{path}?api-version=...`
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.config.base_url.join(path)?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.header("Api-key", api_key)
    }
}

async fn read_text(request: RequestBuilder) -> Result<(reqwest::StatusCode, String)> {
    let response: Response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

fn video_exception(err: impl Into<AgentDeskError>) -> ToolError {
    ToolError::VideoException {
        message: err.into().to_string(),
    }
}
