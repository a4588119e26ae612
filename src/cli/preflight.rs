//! Pre-flight checks before talking to the model.
//!
//! Validates that required configuration is present before starting
//! operations that would otherwise fail on the first request.

use crate::config::Settings;
use crate::error::{AgentDeskError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat and ask need a deployment and an endpoint.
    Chat,
    /// Listing tools only reads configuration.
    ListTools,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat => {
            check_deployment(settings)?;
            check_endpoint(settings)?;
        }
        Operation::ListTools => {}
    }
    Ok(())
}

fn check_deployment(settings: &Settings) -> Result<()> {
    if settings.model.deployment.trim().is_empty() {
        return Err(AgentDeskError::Config(
            "model.deployment is not set. Add it to the [model] section of your config file."
                .to_string(),
        ));
    }
    Ok(())
}

fn check_endpoint(settings: &Settings) -> Result<()> {
    settings.inference_base().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_tools_has_no_requirements() {
        assert!(check(Operation::ListTools, &Settings::default()).is_ok());
    }

    #[test]
    fn test_chat_requires_deployment_and_endpoint() {
        let mut settings = Settings::default();
        settings.model.endpoint = Some("https://res.openai.azure.com/".to_string());
        let err = check(Operation::Chat, &settings).unwrap_err();
        assert!(err.to_string().contains("model.deployment"));

        settings.model.deployment = "gpt-4o-mini".to_string();
        assert!(check(Operation::Chat, &settings).is_ok());

        settings.model.endpoint = None;
        assert!(matches!(
            check(Operation::Chat, &settings),
            Err(AgentDeskError::Config(_))
        ));
    }
}
