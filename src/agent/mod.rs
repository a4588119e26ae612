//! Conversational agent with tool calling.
//!
//! [`AgentLoop`] sends the conversation to a [`ChatModel`], dispatches any
//! requested tool calls, and repeats until the model answers or the round
//! budget runs out. [`SessionState`] holds what lives across user turns.

mod history;
mod model;
mod runner;
mod session;

pub use history::{ConversationHistory, ToolCallRequest, ToolResult, Turn};
pub use model::{ChatModel, Completion, CompletionOptions, OpenAiChatModel};
pub use runner::{
    AgentLoop, AgentResponse, LoopOutcome, ToolCallRecord, TurnOptions, FAILED_SENTINEL,
    NO_TEXT_SENTINEL, ROUND_LIMIT_SENTINEL, TIMED_OUT_SENTINEL,
};
pub use session::{CommandOutcome, SessionCommand, SessionState};
