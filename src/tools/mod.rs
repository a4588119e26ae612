//! Tools the model can call.
//!
//! The [`ToolRegistry`] decides which schemas are declared to the model, and
//! the [`ToolDispatcher`] runs requested calls. Nothing below the dispatcher
//! raises: every failure becomes a structured [`ToolError`] payload that is
//! fed back into the conversation.

mod args;
mod dispatch;
mod error;
mod image;
mod kpi;
mod registry;
mod speech;
mod weather;

pub use args::{clamp_duration, parse_tool_call, ToolArgs};
pub use dispatch::{ToolContext, ToolDispatcher};
pub use error::ToolError;
pub use image::ImageGenerator;
pub use kpi::{kpi_payload, lookup_kpi, UNKNOWN_METRIC};
pub use registry::{Capabilities, ToolKind, ToolRegistry, ToolSchema, MAX_VIDEO_SECONDS};
pub use speech::{SpeechClient, SpeechConfig};
pub use weather::{
    weather_payload, OpenMeteoClient, TempUnit, WeatherProvider, WeatherReading,
};
