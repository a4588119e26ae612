//! Doctor command - verify configuration before chatting.

use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &std::path::Path) -> anyhow::Result<()> {
    Output::header("AgentDesk Doctor");
    println!();

    let sections = [
        ("Chat model", check_model(settings)),
        ("Optional tools", check_capabilities(settings)),
        ("Files", vec![check_config_file(config_path), check_output_dir(settings)]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before chatting.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! AgentDesk is ready to use.");
    }

    Ok(())
}

fn check_model(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if settings.model.deployment.trim().is_empty() {
        results.push(CheckResult::error(
            "Deployment",
            "not set",
            "Set model.deployment in the config file",
        ));
    } else {
        results.push(CheckResult::ok("Deployment", &settings.model.deployment));
    }

    match settings.inference_base() {
        Ok(base) => results.push(CheckResult::ok("Endpoint", base.as_str())),
        Err(e) => results.push(CheckResult::error(
            "Endpoint",
            &e.to_string(),
            "Set model.project_endpoint or model.endpoint",
        )),
    }

    results.push(check_key("API key", settings.model.api_key.as_deref(), "AZURE_OPENAI_KEY"));
    results
}

fn check_capabilities(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![
        optional_model("generate_image", settings.image.model.as_deref(), "image.model"),
        optional_model("speak_summary", settings.speech.model.as_deref(), "speech.model"),
        optional_model("generate_video", settings.video.model.as_deref(), "video.model"),
    ];

    if settings.video.model.is_some() {
        match settings.video_base() {
            Ok(base) => results.push(CheckResult::ok("Video endpoint", base.as_str())),
            Err(e) => results.push(CheckResult::error(
                "Video endpoint",
                &e.to_string(),
                "Set video.endpoint or model.endpoint",
            )),
        }
        results.push(check_key(
            "Video API key",
            settings.video.api_key.as_deref(),
            "AZURE_VIDEO_KEY",
        ));
    }

    results
}

fn optional_model(tool: &str, model: Option<&str>, key: &str) -> CheckResult {
    match model.filter(|m| !m.trim().is_empty()) {
        Some(model) => CheckResult::ok(tool, &format!("enabled ({})", model)),
        None => CheckResult::warning(tool, "disabled", &format!("Set {} to enable", key)),
    }
}

fn check_key(name: &str, key: Option<&str>, env: &str) -> CheckResult {
    match key.filter(|k| !k.trim().is_empty()) {
        Some(key) => CheckResult::ok(name, &format!("configured ({})", mask_key(key))),
        None => CheckResult::warning(
            name,
            "not set",
            &format!("Set it in the config file or export {}", env),
        ),
    }
}

fn check_config_file(config_path: &std::path::Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {}", config_path.display()),
        )
    }
}

fn check_output_dir(settings: &Settings) -> CheckResult {
    let dir = settings.output_dir();
    if dir.is_dir() {
        CheckResult::ok("Output directory", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created when the first artifact is saved",
        )
    }
}

/// Show only the edges of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
