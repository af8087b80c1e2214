//! `sendNotification` - posts a plain-text message to an ntfy-style topic
//!
//! Never fails the turn: every outcome is reported back as text.

use super::{ToolName, ToolOutput};
use crate::llm::ToolDefinition;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const NOT_CONFIGURED: &str = "Error: notification topic URL is not configured.";

/// Input for the `sendNotification` tool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendNotificationInput {
    pub message: String,
}

pub struct NotificationTool {
    client: Client,
    topic_url: Option<String>,
}

impl NotificationTool {
    pub fn new(client: Client, topic_url: Option<String>) -> Self {
        Self { client, topic_url }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: ToolName::SendNotification.as_str().to_string(),
            description: "Send a push notification message to the user's phone.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "The content of the message to send."
                    }
                },
                "required": ["message"]
            }),
        }
    }

    pub async fn run(&self, input: SendNotificationInput) -> ToolOutput {
        let Some(url) = self.topic_url.as_deref() else {
            tracing::warn!("sendNotification called without a topic URL");
            return ToolOutput::error(NOT_CONFIGURED);
        };

        match self.post(url, &input.message).await {
            Ok(()) => {
                tracing::info!(bytes = input.message.len(), "Notification sent");
                ToolOutput::success(format!(
                    "Successfully sent notification: \"{}\"",
                    input.message
                ))
            }
            Err(e) => {
                tracing::error!(error = %e, "Error sending notification");
                ToolOutput::error(format!("Failed to send notification. Error: {e}"))
            }
        }
    }

    async fn post(&self, url: &str, message: &str) -> Result<(), reqwest::Error> {
        self.client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(message.to_owned())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
