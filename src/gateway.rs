//! Model gateway
//!
//! Wraps an [`LlmService`] together with the tool declarations it was
//! configured with at startup. A [`ChatSession`] carries one request's
//! conversation so a tool result can be sent back in the same context.

use crate::llm::{ContentBlock, LlmError, LlmMessage, LlmRequest, LlmService, ToolDefinition};
use serde_json::Value;
use std::sync::Arc;

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// What the model answered with
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    Text(String),
    ToolCall(ToolCall),
}

pub struct ModelGateway {
    service: Arc<dyn LlmService>,
    tools: Vec<ToolDefinition>,
}

impl ModelGateway {
    pub fn new(service: Arc<dyn LlmService>, tools: Vec<ToolDefinition>) -> Self {
        Self { service, tools }
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }

    /// Begin a chat seeded with the caller's prior history
    pub fn start_chat(&self, history: Vec<LlmMessage>) -> ChatSession<'_> {
        ChatSession {
            gateway: self,
            history,
        }
    }
}

/// One request's view of the conversation
pub struct ChatSession<'a> {
    gateway: &'a ModelGateway,
    history: Vec<LlmMessage>,
}

impl ChatSession<'_> {
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<GatewayReply, LlmError> {
        self.send(vec![ContentBlock::text(text)]).await
    }

    /// Send a user turn and interpret the model's answer.
    ///
    /// When the model asks for several tool calls only the first is returned,
    /// and only that one is recorded in the model turn.
    pub async fn send(&mut self, content: Vec<ContentBlock>) -> Result<GatewayReply, LlmError> {
        self.history.push(LlmMessage::user(content));

        let request = LlmRequest {
            messages: self.history.clone(),
            tools: self.gateway.tools.clone(),
        };
        let response = self.gateway.service.complete(&request).await?;
        let text = response.text();

        let mut recorded = Vec::new();
        let mut first_call = None;
        let mut ignored = 0usize;

        for block in response.content {
            match block {
                ContentBlock::Text { .. } => recorded.push(block),
                ContentBlock::ToolUse { .. } if first_call.is_some() => ignored += 1,
                ContentBlock::ToolUse {
                    ref id,
                    ref name,
                    ref input,
                    ..
                } => {
                    first_call = Some(ToolCall {
                        id: id.clone(),
                        name: name.clone(),
                        args: input.clone(),
                    });
                    recorded.push(block);
                }
                ContentBlock::ToolResult { .. } => {}
            }
        }

        if ignored > 0 {
            tracing::warn!(
                ignored,
                "Model requested multiple tool calls; honoring only the first"
            );
        }

        let reply = match first_call {
            Some(call) => GatewayReply::ToolCall(call),
            None => GatewayReply::Text(text),
        };

        self.history.push(LlmMessage::assistant(recorded));
        Ok(reply)
    }

    #[cfg(test)]
    pub fn history(&self) -> &[LlmMessage] {
        &self.history
    }
}
