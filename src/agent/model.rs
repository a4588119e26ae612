//! Chat model boundary.

use super::history::{ToolCallRequest, Turn};
use crate::error::{AgentDeskError, Result};
use crate::tools::ToolSchema;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::debug;

/// Per-request knobs sent with every completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Schemas declared to the model. Empty means no tools.
    pub tools: Vec<ToolSchema>,
}

/// What the model answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A final answer. `text` may be empty.
    Final { text: String },
    /// One or more tool calls, in the order the model listed them.
    ToolCalls {
        text: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
}

/// Anything that can complete a conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, turns: &[Turn], options: &CompletionOptions) -> Result<Completion>;
}

/// [`ChatModel`] backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    deployment: String,
}

impl OpenAiChatModel {
    pub fn new(client: Client<OpenAIConfig>, deployment: &str) -> Self {
        Self {
            client,
            deployment: deployment.to_string(),
        }
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, turns: &[Turn], options: &CompletionOptions) -> Result<Completion> {
        let messages = turns
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.deployment)
            .messages(messages)
            .temperature(options.temperature)
            .max_completion_tokens(options.max_output_tokens);
        if !options.tools.is_empty() {
            builder.tools(options.tools.iter().map(tool_definition).collect::<Vec<_>>());
        }
        let request = builder.build().map_err(openai_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentDeskError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentDeskError::OpenAI("No response from model".to_string()))?;
        debug!("Finish reason: {:?}", choice.finish_reason);

        let calls: Vec<ToolCallRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                call_id: call.id,
                tool_name: call.function.name,
                raw_arguments: call.function.arguments,
            })
            .collect();

        if calls.is_empty() {
            Ok(Completion::Final {
                text: choice.message.content.unwrap_or_default(),
            })
        } else {
            Ok(Completion::ToolCalls {
                text: choice.message.content,
                calls,
            })
        }
    }
}

fn to_request_message(turn: &Turn) -> Result<ChatCompletionRequestMessage> {
    let message = match turn {
        Turn::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(openai_error)?
            .into(),
        Turn::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(openai_error)?
            .into(),
        Turn::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = content.as_ref().filter(|t| !t.is_empty()) {
                args.content(text.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.call_id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.tool_name.clone(),
                                arguments: call.raw_arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build().map_err(openai_error)?.into()
        }
        Turn::ToolResult { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(openai_error)?
            .into(),
    };
    Ok(message)
}

fn tool_definition(schema: &ToolSchema) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: schema.name.clone(),
            description: Some(schema.description.clone()),
            parameters: Some(schema.parameters.clone()),
            strict: None,
        },
    }
}

fn openai_error(err: impl std::fmt::Display) -> AgentDeskError {
    AgentDeskError::OpenAI(err.to_string())
}
