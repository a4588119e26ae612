//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Replace secrets before printing.
fn redacted(mut settings: Settings) -> Settings {
    for key in [&mut settings.model.api_key, &mut settings.video.api_key] {
        if key.is_some() {
            *key = Some("<redacted>".to_string());
        }
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_hides_keys() {
        let mut settings = Settings::default();
        settings.model.api_key = Some("secret".to_string());

        let shown = toml::to_string_pretty(&redacted(settings)).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains("<redacted>"));
    }
}
