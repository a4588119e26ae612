//! Tool names, schemas, and the per-session set of enabled tools.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Maximum clip length accepted by `generate_video`.
pub const MAX_VIDEO_SECONDS: i64 = 10;

/// Every tool the agent knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    LookupKpi,
    GetWeather,
    GenerateImage,
    SpeakSummary,
    GenerateVideo,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::LookupKpi,
        ToolKind::GetWeather,
        ToolKind::GenerateImage,
        ToolKind::SpeakSummary,
        ToolKind::GenerateVideo,
    ];

    /// Name the model uses to call this tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::LookupKpi => "lookup_kpi",
            ToolKind::GetWeather => "get_weather",
            ToolKind::GenerateImage => "generate_image",
            ToolKind::SpeakSummary => "speak_summary",
            ToolKind::GenerateVideo => "generate_video",
        }
    }

    /// Schema declared to the model.
    pub fn schema(self) -> ToolSchema {
        match self {
            ToolKind::LookupKpi => ToolSchema::new(
                self,
                "Given a KPI name, return its definition and a sample formula.",
                json!({
                    "type": "object",
                    "properties": {
                        "metric": {
                            "type": "string",
                            "description": "KPI, e.g., 'MRR' or 'NPS'"
                        }
                    },
                    "required": ["metric"]
                }),
            ),
            ToolKind::GetWeather => ToolSchema::new(
                self,
                "Get current air temperature for a place (city/town/area).",
                json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "City/town/place, e.g., 'Miami' or 'Chennai'"
                        },
                        "unit": {
                            "type": "string",
                            "enum": ["c", "f"],
                            "description": "Temperature unit; default 'c'"
                        }
                    },
                    "required": ["location"]
                }),
            ),
            ToolKind::GenerateImage => ToolSchema::new(
                self,
                "Generate an image based on a textual description.",
                json!({
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string", "description": "Image description" }
                    },
                    "required": ["prompt"]
                }),
            ),
            ToolKind::SpeakSummary => ToolSchema::new(
                self,
                "Convert a text summary into spoken audio.",
                json!({
                    "type": "object",
                    "properties": {
                        "text": { "type": "string", "description": "Text to narrate" }
                    },
                    "required": ["text"]
                }),
            ),
            ToolKind::GenerateVideo => ToolSchema::new(
                self,
                "Generate a short video clip (mp4) from a text prompt and provide a local HTML playground to view it.",
                json!({
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string", "description": "Video description" },
                        "durationSeconds": {
                            "type": "integer",
                            "description": "Requested duration (<=10)",
                            "minimum": 1,
                            "maximum": MAX_VIDEO_SECONDS
                        }
                    },
                    "required": ["prompt"]
                }),
            ),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

/// Name, description and JSON-Schema parameters for one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSchema {
    fn new(kind: ToolKind, description: &str, parameters: Value) -> Self {
        Self {
            name: kind.name().to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    /// Fields listed under `required`.
    pub fn required(&self) -> Vec<&str> {
        self.parameters["required"]
            .as_array()
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Which backing capabilities are available for this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub image: bool,
    pub speech: bool,
    pub video: bool,
}

/// The tools enabled for a session, in declaration order.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    enabled: Vec<ToolKind>,
}

impl ToolRegistry {
    /// Enable the always-available tools plus every configured capability.
    pub fn new(capabilities: Capabilities) -> Self {
        let enabled = ToolKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                ToolKind::LookupKpi | ToolKind::GetWeather => true,
                ToolKind::GenerateImage => capabilities.image,
                ToolKind::SpeakSummary => capabilities.speech,
                ToolKind::GenerateVideo => capabilities.video,
            })
            .collect();
        Self { enabled }
    }

    pub fn is_enabled(&self, kind: ToolKind) -> bool {
        self.enabled.contains(&kind)
    }

    pub fn enabled(&self) -> &[ToolKind] {
        &self.enabled
    }

    /// Schemas attached to every model request.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.enabled.iter().map(|kind| kind.schema()).collect()
    }
}
