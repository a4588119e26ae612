//! Configuration module for AgentDesk.
//!
//! Handles loading settings from TOML and resolving service endpoints.

mod settings;

pub use settings::{
    AgentSettings, GeneralSettings, ImageSettings, ModelSettings, Settings, SpeechSettings,
    VideoSettings, WeatherSettings, DEFAULT_SYSTEM_PROMPT,
};
