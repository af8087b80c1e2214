//! Dispatch loop
//!
//! Drives one end-user turn: ask the model, run at most one tool it asks
//! for, send the tool result back, and return the model's final text.
//!
//! ```text
//! AwaitingInitialResponse --text--> Done
//! AwaitingInitialResponse --tool call--> AwaitingToolResult --text--> Done
//! ```

use crate::gateway::{GatewayReply, ModelGateway, ToolCall};
use crate::llm::{ContentBlock, LlmError, LlmMessage};
use crate::tools::{ToolInvocation, ToolOutput, ToolParseError, ToolRegistry};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The model asked for a tool that does not exist. Not retried and not
    /// reported back to the model.
    #[error("Unknown function call: {0}")]
    UnknownTool(String),
    #[error("Model provider error: {0}")]
    Provider(#[from] LlmError),
}

#[derive(Debug)]
enum DispatchState {
    AwaitingInitialResponse,
    AwaitingToolResult(ToolCall),
    Done(String),
}

pub struct Dispatcher {
    gateway: Arc<ModelGateway>,
    tools: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(gateway: Arc<ModelGateway>, tools: Arc<ToolRegistry>) -> Self {
        Self { gateway, tools }
    }

    /// Resolve one user message against the prior history.
    ///
    /// Exactly one tool call is resolved per turn. If the follow-up answer
    /// asks for another tool, only its text is returned.
    pub async fn run(
        &self,
        prior: Vec<LlmMessage>,
        user_text: String,
    ) -> Result<String, DispatchError> {
        let mut chat = self.gateway.start_chat(prior);
        let mut state = DispatchState::AwaitingInitialResponse;

        loop {
            state = match state {
                DispatchState::AwaitingInitialResponse => {
                    match chat.send_text(user_text.clone()).await? {
                        GatewayReply::Text(text) => DispatchState::Done(text),
                        GatewayReply::ToolCall(call) => DispatchState::AwaitingToolResult(call),
                    }
                }
                DispatchState::AwaitingToolResult(call) => {
                    let output = self.execute(&call).await?;
                    let result =
                        ContentBlock::tool_result(call.name, output.output, !output.success);
                    match chat.send(vec![result]).await? {
                        GatewayReply::Text(text) => DispatchState::Done(text),
                        GatewayReply::ToolCall(next) => {
                            tracing::warn!(
                                tool = %next.name,
                                "Follow-up requested another tool call; chained calls are not resolved"
                            );
                            DispatchState::Done(String::new())
                        }
                    }
                }
                DispatchState::Done(text) => return Ok(text),
            };
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, DispatchError> {
        let invocation = match ToolInvocation::parse(&call.name, &call.args) {
            Ok(invocation) => invocation,
            Err(ToolParseError::Unknown(name)) => {
                tracing::warn!(tool = %name, "Model requested an unknown tool");
                return Err(DispatchError::UnknownTool(name));
            }
            Err(e @ ToolParseError::InvalidArguments { .. }) => {
                tracing::warn!(tool = %call.name, error = %e, "Rejected tool arguments");
                return Ok(ToolOutput::error(e.to_string()));
            }
        };

        let tool = invocation.name();
        let start = std::time::Instant::now();
        let output = self.tools.execute(invocation).await;
        tracing::info!(
            %tool,
            call_id = %call.id,
            success = output.success,
            duration_ms = %start.elapsed().as_millis(),
            "Tool executed"
        );
        Ok(output)
    }
}
