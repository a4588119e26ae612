//! Tool dispatch with failure isolation.

use super::args::{parse_tool_call, ToolArgs};
use super::error::ToolError;
use super::image::ImageGenerator;
use super::kpi::kpi_payload;
use super::registry::{Capabilities, ToolKind, ToolRegistry};
use super::speech::SpeechClient;
use super::weather::{weather_payload, TempUnit, WeatherProvider};
use crate::agent::{ToolCallRequest, ToolResult};
use crate::jobs::VideoJobClient;
use crate::progress::Progress;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

/// Backing services available to tool handlers.
pub struct ToolContext {
    pub weather: Arc<dyn WeatherProvider>,
    pub images: Option<ImageGenerator>,
    pub speech: Option<SpeechClient>,
    pub video: Option<VideoJobClient>,
}

impl ToolContext {
    /// Create a context with only the always-available tools.
    pub fn new(weather: Arc<dyn WeatherProvider>) -> Self {
        Self {
            weather,
            images: None,
            speech: None,
            video: None,
        }
    }

    pub fn with_images(mut self, images: ImageGenerator) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_speech(mut self, speech: SpeechClient) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_video(mut self, video: VideoJobClient) -> Self {
        self.video = Some(video);
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            image: self.images.is_some(),
            speech: self.speech.is_some(),
            video: self.video.is_some(),
        }
    }
}

/// Runs tool calls and turns every outcome into a [`ToolResult`].
pub struct ToolDispatcher {
    registry: ToolRegistry,
    context: ToolContext,
}

impl ToolDispatcher {
    /// Create a dispatcher whose registry matches the configured capabilities.
    pub fn new(context: ToolContext) -> Self {
        Self {
            registry: ToolRegistry::new(context.capabilities()),
            context,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one call. Never fails: errors become `{error: <kind>, ...}` payloads.
    pub async fn dispatch(
        &self,
        call: &ToolCallRequest,
        default_unit: TempUnit,
        progress: &dyn Progress,
    ) -> ToolResult {
        info!(
            "Agent calling tool: {} with args: {}",
            call.tool_name, call.raw_arguments
        );

        let outcome = match parse_tool_call(&call.tool_name, &call.raw_arguments) {
            Ok(args) => self.run_isolated(args, default_unit, progress).await,
            Err(e) => Err(e),
        };

        let output = match outcome {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed: {}", call.tool_name, e);
                e.payload()
            }
        };

        ToolResult {
            call_id: call.call_id.clone(),
            output,
        }
    }

    async fn run_isolated(
        &self,
        args: ToolArgs,
        default_unit: TempUnit,
        progress: &dyn Progress,
    ) -> Result<Value, ToolError> {
        let kind = args.kind();
        if !self.registry.is_enabled(kind) {
            return Err(not_configured(kind));
        }

        match AssertUnwindSafe(self.execute(args, default_unit, progress))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => Err(ToolError::exception(panic_message(panic.as_ref()))),
        }
    }

    async fn execute(
        &self,
        args: ToolArgs,
        default_unit: TempUnit,
        progress: &dyn Progress,
    ) -> Result<Value, ToolError> {
        match args {
            ToolArgs::LookupKpi { metric } => {
                progress.update(&format!("calling lookup_kpi(\"{}\")…", metric));
                Ok(kpi_payload(&metric))
            }
            ToolArgs::GetWeather { location, unit } => {
                let unit = unit.unwrap_or(default_unit);
                progress.update(&format!("calling get_weather(\"{}\", \"{}\")…", location, unit));
                let reading = self
                    .context
                    .weather
                    .current_temperature(&location)
                    .await
                    .map_err(ToolError::exception)?;
                Ok(weather_payload(&reading, unit))
            }
            ToolArgs::GenerateImage { prompt } => {
                let images = self
                    .context
                    .images
                    .as_ref()
                    .ok_or(ToolError::ImageNotConfigured)?;
                progress.update("generating image…");
                images.generate(&prompt).await
            }
            ToolArgs::SpeakSummary { text } => {
                let speech = self
                    .context
                    .speech
                    .as_ref()
                    .ok_or(ToolError::SpeechNotConfigured)?;
                progress.update("calling speech API…");
                speech.narrate(&text).await
            }
            ToolArgs::GenerateVideo {
                prompt,
                duration_seconds,
            } => {
                let video = self
                    .context
                    .video
                    .as_ref()
                    .ok_or(ToolError::VideoNotConfigured)?;
                video.generate(&prompt, duration_seconds, progress).await
            }
        }
    }
}

fn not_configured(kind: ToolKind) -> ToolError {
    match kind {
        ToolKind::GenerateImage => ToolError::ImageNotConfigured,
        ToolKind::SpeakSummary => ToolError::SpeechNotConfigured,
        ToolKind::GenerateVideo => ToolError::VideoNotConfigured,
        ToolKind::LookupKpi | ToolKind::GetWeather => {
            ToolError::exception(format!("tool {} is disabled", kind))
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentDeskError, Result};
    use crate::progress::NoProgress;
    use crate::tools::weather::WeatherReading;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeWeather {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for FakeWeather {
        async fn current_temperature(&self, location: &str) -> Result<WeatherReading> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match location {
                "Atlantis" => Err(AgentDeskError::Weather("Location not found".to_string())),
                "Panic City" => panic!("geocoder exploded"),
                _ => Ok(WeatherReading {
                    celsius: 20.0,
                    resolved_name: format!("{}, Somewhere", location),
                }),
            }
        }
    }

    fn call(name: &str, args: &str) -> ToolCallRequest {
        ToolCallRequest {
            call_id: "call_1".to_string(),
            tool_name: name.to_string(),
            raw_arguments: args.to_string(),
        }
    }

    fn dispatcher() -> (ToolDispatcher, Arc<FakeWeather>) {
        let weather = Arc::new(FakeWeather::default());
        (ToolDispatcher::new(ToolContext::new(weather.clone())), weather)
    }

    #[tokio::test]
    async fn test_missing_location_makes_no_remote_call() {
        let (dispatcher, weather) = dispatcher();
        let result = dispatcher
            .dispatch(&call("get_weather", "{}"), TempUnit::Celsius, &NoProgress)
            .await;

        assert_eq!(result.call_id, "call_1");
        assert_eq!(result.output, json!({ "error": "missing_location" }));
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_weather_uses_default_unit() {
        let (dispatcher, _) = dispatcher();
        let result = dispatcher
            .dispatch(&call("get_weather", r#"{"location": "Miami"}"#), TempUnit::Fahrenheit, &NoProgress)
            .await;

        assert_eq!(result.output["temperature"], 68.0);
        assert_eq!(result.output["unit"], "°F");
        assert_eq!(result.output["location"], "Miami, Somewhere");
    }

    #[tokio::test]
    async fn test_unresolved_location_is_tool_exception() {
        let (dispatcher, _) = dispatcher();
        let result = dispatcher
            .dispatch(&call("get_weather", r#"{"location": "Atlantis"}"#), TempUnit::Celsius, &NoProgress)
            .await;

        assert_eq!(result.output["error"], "tool_exception");
        assert!(result.output["message"]
            .as_str()
            .unwrap()
            .contains("Location not found"));
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let (dispatcher, _) = dispatcher();
        let result = dispatcher
            .dispatch(&call("get_weather", r#"{"location": "Panic City"}"#), TempUnit::Celsius, &NoProgress)
            .await;

        assert_eq!(
            result.output,
            json!({ "error": "tool_exception", "message": "geocoder exploded" })
        );
    }

    #[tokio::test]
    async fn test_disabled_tools_report_configuration_errors() {
        let (dispatcher, _) = dispatcher();
        assert!(!dispatcher.registry().is_enabled(ToolKind::GenerateVideo));

        let video = dispatcher
            .dispatch(&call("generate_video", r#"{"prompt": "waves"}"#), TempUnit::Celsius, &NoProgress)
            .await;
        assert_eq!(video.output, json!({ "error": "video_not_configured" }));

        let speech = dispatcher
            .dispatch(&call("speak_summary", r#"{"text": "hi"}"#), TempUnit::Celsius, &NoProgress)
            .await;
        assert_eq!(speech.output, json!({ "error": "speech_not_configured" }));

        let image = dispatcher
            .dispatch(&call("generate_image", r#"{"prompt": "a cat"}"#), TempUnit::Celsius, &NoProgress)
            .await;
        assert_eq!(image.output, json!({ "error": "image_not_configured" }));
    }

    #[tokio::test]
    async fn test_kpi_lookup_payload() {
        let (dispatcher, _) = dispatcher();
        let lower = dispatcher
            .dispatch(&call("lookup_kpi", r#"{"metric": "mrr"}"#), TempUnit::Celsius, &NoProgress)
            .await;
        let upper = dispatcher
            .dispatch(&call("lookup_kpi", r#"{"metric": "MRR"}"#), TempUnit::Celsius, &NoProgress)
            .await;

        assert_eq!(lower.output["definition"], upper.output["definition"]);
        assert_eq!(lower.output["source"], "local-kb");
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_arguments() {
        let (dispatcher, _) = dispatcher();
        let unknown = dispatcher
            .dispatch(&call("launch_rocket", "{}"), TempUnit::Celsius, &NoProgress)
            .await;
        assert_eq!(
            unknown.output,
            json!({ "error": "unknown_tool", "name": "launch_rocket" })
        );

        let bad = dispatcher
            .dispatch(&call("lookup_kpi", "not json"), TempUnit::Celsius, &NoProgress)
            .await;
        assert_eq!(bad.output["error"], "bad_arguments");
    }
}
