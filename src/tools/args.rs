//! Typed tool arguments parsed from the model's raw JSON.

use super::error::ToolError;
use super::registry::{ToolKind, MAX_VIDEO_SECONDS};
use super::weather::TempUnit;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Validated arguments for one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    LookupKpi { metric: String },
    GetWeather { location: String, unit: Option<TempUnit> },
    GenerateImage { prompt: String },
    SpeakSummary { text: String },
    GenerateVideo { prompt: String, duration_seconds: Option<u32> },
}

impl ToolArgs {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolArgs::LookupKpi { .. } => ToolKind::LookupKpi,
            ToolArgs::GetWeather { .. } => ToolKind::GetWeather,
            ToolArgs::GenerateImage { .. } => ToolKind::GenerateImage,
            ToolArgs::SpeakSummary { .. } => ToolKind::SpeakSummary,
            ToolArgs::GenerateVideo { .. } => ToolKind::GenerateVideo,
        }
    }
}

#[derive(Deserialize)]
struct KpiArgs {
    metric: String,
}

#[derive(Deserialize)]
struct WeatherArgs {
    location: String,
    #[serde(default)]
    unit: Option<TempUnit>,
}

#[derive(Deserialize)]
struct PromptArgs {
    prompt: String,
}

#[derive(Deserialize)]
struct SpeechArgs {
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoArgs {
    prompt: String,
    #[serde(default)]
    duration_seconds: Option<i64>,
}

/// Parse a tool call from its name and raw argument string.
///
/// Unknown names map to `unknown_tool`, unparseable or mistyped payloads to
/// `bad_arguments`, and a weather call without a location to `missing_location`.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolArgs, ToolError> {
    let kind: ToolKind = name.parse().map_err(|_| ToolError::UnknownTool {
        name: name.to_string(),
    })?;

    let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
    let args: Value = serde_json::from_str(raw)
        .map_err(|e| ToolError::bad_arguments(format!("Invalid tool arguments: {}", e)))?;
    if !args.is_object() {
        return Err(ToolError::bad_arguments("arguments must be a JSON object"));
    }

    match kind {
        ToolKind::LookupKpi => {
            let KpiArgs { metric } = extract(args)?;
            Ok(ToolArgs::LookupKpi { metric })
        }
        ToolKind::GetWeather => {
            if args.get("location").map_or(true, Value::is_null) {
                return Err(ToolError::MissingLocation);
            }
            let WeatherArgs { location, unit } = extract(args)?;
            Ok(ToolArgs::GetWeather { location, unit })
        }
        ToolKind::GenerateImage => {
            let PromptArgs { prompt } = extract(args)?;
            Ok(ToolArgs::GenerateImage { prompt })
        }
        ToolKind::SpeakSummary => {
            let SpeechArgs { text } = extract(args)?;
            Ok(ToolArgs::SpeakSummary { text })
        }
        ToolKind::GenerateVideo => {
            let VideoArgs {
                prompt,
                duration_seconds,
            } = extract(args)?;
            Ok(ToolArgs::GenerateVideo {
                prompt,
                duration_seconds: duration_seconds.map(clamp_duration),
            })
        }
    }
}

fn extract<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::bad_arguments(e.to_string()))
}

/// Clamp a requested clip length into `1..=MAX_VIDEO_SECONDS`.
pub fn clamp_duration(seconds: i64) -> u32 {
    seconds.clamp(1, MAX_VIDEO_SECONDS) as u32
}
