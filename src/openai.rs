//! OpenAI-compatible client configuration.

use crate::config::Settings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

/// Default timeout for requests made through the shared client.
///
/// Chat completions get their own, shorter budget from the agent loop.
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Create a client pointed at the configured inference base.
pub fn create_client(settings: &Settings) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(settings, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client with a custom timeout.
///
/// Rate-limited responses are returned as errors on the first attempt.
pub fn create_client_with_timeout(
    settings: &Settings,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Client::with_config(client_config(settings)?)
        .with_http_client(http_client)
        .with_backoff(no_retry()))
}

/// Backoff policy that gives up as soon as any time has elapsed.
fn no_retry() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

fn client_config(settings: &Settings) -> Result<OpenAIConfig> {
    let base = settings.inference_base()?;
    let mut config = OpenAIConfig::new().with_api_base(base.as_str().trim_end_matches('/'));
    if let Some(key) = settings.model.api_key.as_deref() {
        config = config.with_api_key(key);
    }
    Ok(config)
}
