//! Configuration settings for AgentDesk.

use crate::error::{AgentDeskError, Result};
use crate::tools::TempUnit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default system prompt for new conversations.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a precise research assistant. \
Use tools when helpful. Use get_weather for any weather/temperature question. \
If you call lookup_kpi, cite 'local-kb'. \
Return: TL;DR (1 line), bullet points, and 'Sources' at the end.";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub agent: AgentSettings,
    pub weather: WeatherSettings,
    pub image: ImageSettings,
    pub speech: SpeechSettings,
    pub video: VideoSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where generated artifacts (images, audio, video) are written.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chat model connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Deployment (model) name used for chat completions. Required.
    pub deployment: String,
    /// Project endpoint, e.g. `https://<name>.services.ai.azure.com/api/projects/<project>`.
    pub project_endpoint: Option<String>,
    /// Resource endpoint, e.g. `https://<resource>.openai.azure.com/`.
    pub endpoint: Option<String>,
    /// API key. Falls back to `AZURE_OPENAI_KEY`.
    pub api_key: Option<String>,
    /// Sampling temperature (0..=2).
    pub temperature: f32,
    /// Maximum output tokens per completion.
    pub max_output_tokens: u32,
    /// Timeout for a single completion call.
    pub timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            deployment: String::new(),
            project_endpoint: None,
            endpoint: None,
            api_key: None,
            temperature: 0.2,
            max_output_tokens: 800,
            timeout_seconds: 45,
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub system_prompt: String,
    /// Hard cap on tool-calling rounds per user turn.
    pub max_tool_rounds: usize,
    /// Unit used by `get_weather` when the model does not pass one.
    pub default_unit: TempUnit,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tool_rounds: 4,
            default_unit: TempUnit::Celsius,
        }
    }
}

/// Open-Meteo endpoints used by `get_weather`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub timeout_seconds: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Image generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImageSettings {
    /// Image model deployment. `None` disables `generate_image`.
    pub model: Option<String>,
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Speech model deployment. `None` disables `speak_summary`.
    pub model: Option<String>,
    pub voice: String,
    /// Audio container requested from the service, also used as file extension.
    pub format: String,
    pub timeout_seconds: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model: None,
            voice: "alloy".to_string(),
            format: "wav".to_string(),
            timeout_seconds: 60,
        }
    }
}

/// Video generation job settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Video model deployment. `None` disables `generate_video`.
    pub model: Option<String>,
    /// Endpoint for video jobs. Defaults to `model.endpoint`.
    pub endpoint: Option<String>,
    /// API key for video jobs. Falls back to `AZURE_VIDEO_KEY`.
    pub api_key: Option<String>,
    pub api_version: String,
    pub width: u32,
    pub height: u32,
    pub default_duration_seconds: u32,
    /// Delay before each status poll.
    pub poll_interval_seconds: u64,
    /// Wall-clock budget for the whole poll phase.
    pub poll_deadline_seconds: u64,
    /// Timeout for each create/poll/download request.
    pub request_timeout_seconds: u64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            model: None,
            endpoint: None,
            api_key: None,
            api_version: "preview".to_string(),
            width: 480,
            height: 480,
            default_duration_seconds: 5,
            poll_interval_seconds: 5,
            poll_deadline_seconds: 300,
            request_timeout_seconds: 180,
        }
    }
}

impl VideoSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn poll_deadline(&self) -> Duration {
        Duration::from_secs(self.poll_deadline_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied after the file is read.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Fill unset credentials from the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if is_blank(&self.model.api_key) {
            self.model.api_key = non_empty("AZURE_OPENAI_KEY");
        }
        if is_blank(&self.video.api_key) {
            self.video.api_key = non_empty("AZURE_VIDEO_KEY");
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agentdesk")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded artifact output directory.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_seconds)
    }

    /// Resolve the `/openai/v1/` inference base for chat and speech calls.
    ///
    /// A project endpoint wins over a resource endpoint; only its scheme and host are kept.
    pub fn inference_base(&self) -> Result<Url> {
        if let Some(project) = non_blank(&self.model.project_endpoint) {
            let url = Url::parse(project)?;
            let host = url.host_str().ok_or_else(|| {
                AgentDeskError::Config(format!("project endpoint has no host: {}", project))
            })?;
            return Ok(Url::parse(&format!("{}://{}/openai/v1/", url.scheme(), host))?);
        }

        if let Some(resource) = non_blank(&self.model.endpoint) {
            return Ok(Url::parse(resource)?.join("/openai/v1/")?);
        }

        Err(AgentDeskError::Config(
            "provide either 'model.project_endpoint' or 'model.endpoint'".to_string(),
        ))
    }

    /// Resolve the base URL for video job endpoints.
    ///
    /// Uses `video.endpoint`, falling back to `model.endpoint`, and appends
    /// `openai/v1/` unless the path already contains it.
    pub fn video_base(&self) -> Result<Url> {
        let raw = non_blank(&self.video.endpoint)
            .or_else(|| non_blank(&self.model.endpoint))
            .ok_or_else(|| AgentDeskError::Config("no video endpoint configured".to_string()))?;

        let mut base = raw.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        if !base.to_lowercase().contains("/openai/v1/") {
            base.push_str("openai/v1/");
        }
        Ok(Url::parse(&base)?)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    non_blank(value).is_none()
}
