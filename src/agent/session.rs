//! Per-session conversation state and REPL commands.

use super::history::ConversationHistory;
use super::model::CompletionOptions;
use super::runner::TurnOptions;
use crate::config::Settings;
use crate::tools::{TempUnit, ToolRegistry};

const COMMAND_HELP: &str = "unknown command. try: /exit, /reset, /sys, /temp, /unit";

/// A slash command typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Exit,
    Reset,
    SetSystemPrompt(String),
    SetTemperature(f32),
    SetUnit(TempUnit),
}

impl SessionCommand {
    /// Parse a line starting with `/`. The error is the message to show the user.
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let input = input.trim();
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };

        match name.to_lowercase().as_str() {
            "/exit" => Ok(SessionCommand::Exit),
            "/reset" => Ok(SessionCommand::Reset),
            "/sys" if !rest.is_empty() => Ok(SessionCommand::SetSystemPrompt(rest.to_string())),
            "/sys" => Err("usage: /sys <new system prompt>".to_string()),
            "/temp" => rest
                .parse::<f32>()
                .ok()
                .filter(|t| (0.0..=2.0).contains(t))
                .map(SessionCommand::SetTemperature)
                .ok_or_else(|| "usage: /temp <0..2>".to_string()),
            "/unit" => rest
                .parse::<TempUnit>()
                .map(SessionCommand::SetUnit)
                .map_err(|_| "usage: /unit c|f".to_string()),
            _ => Err(COMMAND_HELP.to_string()),
        }
    }
}

/// What the REPL should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Exit,
    Notice(String),
}

/// Everything that lives for one chat session.
#[derive(Debug, Clone)]
pub struct SessionState {
    history: ConversationHistory,
    temperature: f32,
    max_output_tokens: u32,
    default_unit: TempUnit,
    max_tool_rounds: usize,
}

impl SessionState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            history: ConversationHistory::new(&settings.agent.system_prompt),
            temperature: settings.model.temperature,
            max_output_tokens: settings.model.max_output_tokens,
            default_unit: settings.agent.default_unit,
            max_tool_rounds: settings.agent.max_tool_rounds,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut ConversationHistory {
        &mut self.history
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn default_unit(&self) -> TempUnit {
        self.default_unit
    }

    pub fn max_tool_rounds(&self) -> usize {
        self.max_tool_rounds
    }

    pub fn apply(&mut self, command: SessionCommand) -> CommandOutcome {
        match command {
            SessionCommand::Exit => CommandOutcome::Exit,
            SessionCommand::Reset => {
                self.history.reset();
                CommandOutcome::Notice("conversation reset (system prompt retained).".to_string())
            }
            SessionCommand::SetSystemPrompt(prompt) => {
                self.history.reset_with_system(&prompt);
                CommandOutcome::Notice("system prompt updated & conversation reset.".to_string())
            }
            SessionCommand::SetTemperature(t) => {
                self.temperature = t;
                CommandOutcome::Notice(format!("temperature set to {:.2}", t))
            }
            SessionCommand::SetUnit(unit) => {
                self.default_unit = unit;
                CommandOutcome::Notice(format!("default weather unit set to '{}'", unit.code()))
            }
        }
    }

    /// Text actually sent for `input`.
    ///
    /// Temperature questions without an explicit " in " get the default unit appended.
    pub fn user_message(&self, input: &str) -> String {
        let lower = input.to_lowercase();
        if lower.contains("temperature") && !lower.contains(" in ") {
            format!("{} (use unit '{}')", input, self.default_unit.code())
        } else {
            input.to_string()
        }
    }

    /// Append the user turn for `input`.
    pub fn begin_turn(&mut self, input: &str) {
        let message = self.user_message(input);
        self.history.push_user(&message);
    }

    pub fn turn_options(&self, registry: &ToolRegistry) -> TurnOptions {
        TurnOptions {
            completion: CompletionOptions {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                tools: registry.schemas(),
            },
            default_unit: self.default_unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::history::Turn;
    use crate::tools::Capabilities;

    fn session() -> SessionState {
        SessionState::from_settings(&Settings::default())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("/exit"), Ok(SessionCommand::Exit));
        assert_eq!(SessionCommand::parse("/RESET"), Ok(SessionCommand::Reset));
        assert_eq!(
            SessionCommand::parse("/sys  be brief "),
            Ok(SessionCommand::SetSystemPrompt("be brief".to_string()))
        );
        assert_eq!(SessionCommand::parse("/temp 1.5"), Ok(SessionCommand::SetTemperature(1.5)));
        assert_eq!(
            SessionCommand::parse("/unit F"),
            Ok(SessionCommand::SetUnit(TempUnit::Fahrenheit))
        );
    }

    #[test]
    fn test_invalid_usage_messages() {
        assert_eq!(
            SessionCommand::parse("/temp 3"),
            Err("usage: /temp <0..2>".to_string())
        );
        assert_eq!(SessionCommand::parse("/unit k"), Err("usage: /unit c|f".to_string()));
        assert_eq!(
            SessionCommand::parse("/sys"),
            Err("usage: /sys <new system prompt>".to_string())
        );
        assert_eq!(SessionCommand::parse("/help"), Err(COMMAND_HELP.to_string()));
    }

    #[test]
    fn test_sys_replaces_prompt_and_resets() {
        let mut session = session();
        session.begin_turn("hello");
        session.apply(SessionCommand::SetSystemPrompt("new prompt".to_string()));

        assert_eq!(session.history().system_prompt(), "new prompt");
        assert_eq!(
            session.history().turns(),
            &[Turn::System {
                content: "new prompt".to_string()
            }]
        );
    }

    #[test]
    fn test_temperature_question_gets_unit_hint() {
        let mut session = session();
        session.apply(SessionCommand::SetUnit(TempUnit::Fahrenheit));

        assert_eq!(
            session.user_message("What's the temperature right now?"),
            "What's the temperature right now? (use unit 'f')"
        );
        assert_eq!(
            session.user_message("temperature in Miami"),
            "temperature in Miami"
        );
    }

    #[test]
    fn test_turn_options_follow_session() {
        let mut session = session();
        session.apply(SessionCommand::SetTemperature(0.7));
        let registry = ToolRegistry::new(Capabilities::default());

        let options = session.turn_options(&registry);
        assert_eq!(options.completion.temperature, 0.7);
        assert_eq!(options.completion.tools.len(), 2);
        assert_eq!(options.default_unit, TempUnit::Celsius);
    }
}
