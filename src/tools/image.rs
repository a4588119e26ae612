//! Image generation through the OpenAI images API.

use super::error::ToolError;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateImageRequestArgs, ImageModel};
use async_openai::Client;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Generates images and saves them to the output directory.
pub struct ImageGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    output_dir: PathBuf,
}

impl ImageGenerator {
    pub fn new(client: Client<OpenAIConfig>, model: &str, output_dir: PathBuf) -> Self {
        Self {
            client,
            model: model.to_string(),
            output_dir,
        }
    }

    /// Generate one image for `prompt` and return `{image, source}`.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn generate(&self, prompt: &str) -> Result<Value, ToolError> {
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(ImageModel::Other(self.model.clone()))
            .n(1)
            .build()
            .map_err(ToolError::exception)?;

        let response = self
            .client
            .images()
            .create(request)
            .await
            .map_err(ToolError::exception)?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(ToolError::exception)?;
        let paths = response
            .save(&self.output_dir)
            .await
            .map_err(ToolError::exception)?;
        let image = paths
            .first()
            .ok_or_else(|| ToolError::exception("image response contained no images"))?;
        info!("Saved image to {}", image.display());

        Ok(json!({
            "image": image.display().to_string(),
            "source": self.model
        }))
    }
}
