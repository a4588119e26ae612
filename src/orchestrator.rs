//! Wires configuration into a ready-to-run agent.
//!
//! Optional capabilities (image, speech, video) are enabled only when their
//! model is configured; the others stay hidden from the model.

use crate::agent::{AgentLoop, OpenAiChatModel, SessionState};
use crate::config::Settings;
use crate::error::{AgentDeskError, Result};
use crate::jobs::{VideoJobClient, VideoJobConfig};
use crate::openai::create_client;
use crate::tools::{
    Capabilities, ImageGenerator, OpenMeteoClient, SpeechClient, SpeechConfig, ToolContext,
    ToolDispatcher, ToolRegistry,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the configured agent loop and its tool dispatcher.
pub struct Orchestrator {
    settings: Settings,
    agent: AgentLoop,
    dispatcher: Arc<ToolDispatcher>,
}

impl Orchestrator {
    /// Build every collaborator from `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        if settings.model.deployment.trim().is_empty() {
            return Err(AgentDeskError::Config(
                "model.deployment is not set".to_string(),
            ));
        }

        let client = create_client(&settings)?;
        let dispatcher = Arc::new(ToolDispatcher::new(build_tool_context(&settings, &client)?));

        let model = Arc::new(OpenAiChatModel::new(client, &settings.model.deployment));
        info!(
            "Using deployment {} at {}",
            model.deployment(),
            settings.inference_base()?
        );

        let agent = AgentLoop::new(model, dispatcher.clone(), settings.completion_timeout());

        Ok(Self {
            settings,
            agent,
            dispatcher,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn agent(&self) -> &AgentLoop {
        &self.agent
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    /// Fresh session state seeded from settings.
    pub fn new_session(&self) -> SessionState {
        SessionState::from_settings(&self.settings)
    }
}

/// Capabilities `settings` would enable, without building any client.
pub fn configured_capabilities(settings: &Settings) -> Capabilities {
    let configured = |model: &Option<String>| {
        model.as_deref().is_some_and(|m| !m.trim().is_empty())
    };
    Capabilities {
        image: configured(&settings.image.model),
        speech: configured(&settings.speech.model),
        video: configured(&settings.video.model),
    }
}

/// Assemble the tool context, enabling each optional capability that is configured.
pub fn build_tool_context(
    settings: &Settings,
    client: &async_openai::Client<async_openai::config::OpenAIConfig>,
) -> Result<ToolContext> {
    let weather = Arc::new(OpenMeteoClient::new(&settings.weather)?);
    let mut context = ToolContext::new(weather);

    match settings.image.model.as_deref().filter(|m| !m.trim().is_empty()) {
        Some(model) => {
            context = context.with_images(ImageGenerator::new(
                client.clone(),
                model,
                settings.output_dir(),
            ));
        }
        None => info!("Image generation disabled (no image.model)"),
    }

    match SpeechConfig::from_settings(settings)? {
        Some(config) => {
            if config.api_key.is_none() {
                warn!("Speech is configured without an API key; speak_summary will fail");
            }
            context = context.with_speech(SpeechClient::new(config)?);
        }
        None => info!("Speech disabled (no speech.model)"),
    }

    match VideoJobConfig::from_settings(settings)? {
        Some(config) => {
            if config.api_key.is_none() {
                warn!("Video is configured without an API key; generate_video will fail");
            }
            context = context.with_video(VideoJobClient::new(config)?);
        }
        None => info!("Video disabled (no video.model)"),
    }

    Ok(context)
}
