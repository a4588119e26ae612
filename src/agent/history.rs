//! Conversation history and the turns it is made of.

use crate::error::{AgentDeskError, Result};
use serde::Serialize;
use serde_json::Value;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub tool_name: String,
    /// Arguments exactly as the model produced them.
    pub raw_arguments: String,
}

/// Outcome of one tool call. Failures are carried as `{error: ...}` payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub call_id: String,
    pub output: Value,
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        self.output.get("error").is_some()
    }

    /// Payload text sent back to the model.
    pub fn content(&self) -> String {
        self.output.to_string()
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    ToolResult {
        call_id: String,
        content: String,
    },
}

/// Ordered conversation, always starting with a system turn.
///
/// Only appends are allowed; [`reset`](Self::reset) is the single way to drop
/// turns and it keeps the system turn. Tool results are accepted only directly
/// after the assistant turn that requested them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            turns: vec![Turn::System {
                content: system_prompt.to_string(),
            }],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn system_prompt(&self) -> &str {
        match self.turns.first() {
            Some(Turn::System { content }) => content,
            _ => "",
        }
    }

    /// Truncate to the system turn.
    pub fn reset(&mut self) {
        self.turns.truncate(1);
    }

    /// Replace the system prompt and truncate to it.
    pub fn reset_with_system(&mut self, system_prompt: &str) {
        self.turns.clear();
        self.turns.push(Turn::System {
            content: system_prompt.to_string(),
        });
    }

    pub fn push_user(&mut self, content: &str) {
        self.turns.push(Turn::User {
            content: content.to_string(),
        });
    }

    pub fn push_assistant(&mut self, content: Option<String>, tool_calls: Vec<ToolCallRequest>) {
        self.turns.push(Turn::Assistant {
            content,
            tool_calls,
        });
    }

    /// Append a tool result, checking it answers an outstanding call of the
    /// immediately preceding assistant turn.
    pub fn push_tool_result(&mut self, result: &ToolResult) -> Result<()> {
        let mut answered = Vec::new();
        let mut requested = None;

        for turn in self.turns.iter().rev() {
            match turn {
                Turn::ToolResult { call_id, .. } => answered.push(call_id.as_str()),
                Turn::Assistant { tool_calls, .. } => {
                    requested = Some(tool_calls);
                    break;
                }
                _ => break,
            }
        }

        let requested = requested.ok_or_else(|| {
            AgentDeskError::Agent(format!(
                "tool result {} does not follow an assistant turn",
                result.call_id
            ))
        })?;
        if !requested.iter().any(|call| call.call_id == result.call_id) {
            return Err(AgentDeskError::Agent(format!(
                "tool result {} answers no requested call",
                result.call_id
            )));
        }
        if answered.contains(&result.call_id.as_str()) {
            return Err(AgentDeskError::Agent(format!(
                "tool call {} already has a result",
                result.call_id
            )));
        }

        self.turns.push(Turn::ToolResult {
            call_id: result.call_id.clone(),
            content: result.content(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> ToolCallRequest {
        ToolCallRequest {
            call_id: id.to_string(),
            tool_name: "lookup_kpi".to_string(),
            raw_arguments: r#"{"metric":"MRR"}"#.to_string(),
        }
    }

    fn result(id: &str) -> ToolResult {
        ToolResult {
            call_id: id.to_string(),
            output: json!({ "definition": "..." }),
        }
    }

    #[test]
    fn test_reset_keeps_system_turn() {
        let mut history = ConversationHistory::new("be precise");
        history.push_user("hi");
        history.push_assistant(Some("hello".to_string()), vec![]);
        history.reset();

        assert_eq!(history.len(), 1);
        assert_eq!(history.system_prompt(), "be precise");
    }

    #[test]
    fn test_reset_with_new_system_prompt() {
        let mut history = ConversationHistory::new("old");
        history.push_user("hi");
        history.reset_with_system("new");

        assert_eq!(
            history.turns(),
            &[Turn::System {
                content: "new".to_string()
            }]
        );
    }

    #[test]
    fn test_tool_results_follow_their_assistant_turn() {
        let mut history = ConversationHistory::new("sys");
        history.push_user("q");
        history.push_assistant(None, vec![call("a"), call("b")]);

        history.push_tool_result(&result("a")).unwrap();
        history.push_tool_result(&result("b")).unwrap();
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_rejects_orphan_and_duplicate_results() {
        let mut history = ConversationHistory::new("sys");
        history.push_user("q");
        assert!(history.push_tool_result(&result("a")).is_err());

        history.push_assistant(None, vec![call("a")]);
        assert!(history.push_tool_result(&result("zzz")).is_err());
        history.push_tool_result(&result("a")).unwrap();
        assert!(history.push_tool_result(&result("a")).is_err());
    }

    #[test]
    fn test_tool_result_content_is_json() {
        let r = ToolResult {
            call_id: "x".to_string(),
            output: json!({ "error": "missing_location" }),
        };
        assert!(r.is_error());
        assert_eq!(r.content(), r#"{"error":"missing_location"}"#);
    }
}
