//! Tools the model may call mid-conversation
//!
//! The tool set is closed: every known tool is a variant of [`ToolName`], and
//! a decoded call is a [`ToolInvocation`] carrying its typed arguments.

mod clock;
mod notify;

pub use clock::CurrentTimeTool;
pub use notify::{NotificationTool, SendNotificationInput};

use crate::llm::ToolDefinition;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result from tool execution
///
/// Failures are still results: the text goes back to the model either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Names of the tools advertised to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetCurrentTime,
    SendNotification,
}

impl ToolName {
    pub const ALL: [ToolName; 2] = [ToolName::GetCurrentTime, ToolName::SendNotification];

    /// Name as it appears in function declarations and calls
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetCurrentTime => "getCurrentTime",
            ToolName::SendNotification => "sendNotification",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn definition(self) -> ToolDefinition {
        match self {
            ToolName::GetCurrentTime => CurrentTimeTool::definition(),
            ToolName::SendNotification => NotificationTool::definition(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    GetCurrentTime,
    SendNotification(SendNotificationInput),
}

#[derive(Debug, Error)]
pub enum ToolParseError {
    #[error("Unknown function call: {0}")]
    Unknown(String),
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: ToolName,
        #[source]
        source: serde_json::Error,
    },
}

impl ToolInvocation {
    /// Decode a model-issued call into a typed invocation
    pub fn parse(name: &str, args: &Value) -> Result<Self, ToolParseError> {
        let tool = ToolName::from_wire(name).ok_or_else(|| ToolParseError::Unknown(name.to_string()))?;
        match tool {
            // Takes no arguments; whatever the model sent is ignored
            ToolName::GetCurrentTime => Ok(ToolInvocation::GetCurrentTime),
            ToolName::SendNotification => serde_json::from_value(args.clone())
                .map(ToolInvocation::SendNotification)
                .map_err(|source| ToolParseError::InvalidArguments { tool, source }),
        }
    }

    pub fn name(&self) -> ToolName {
        match self {
            ToolInvocation::GetCurrentTime => ToolName::GetCurrentTime,
            ToolInvocation::SendNotification(_) => ToolName::SendNotification,
        }
    }
}

/// The fixed set of tools available to every conversation
///
/// Built once at startup; holds no per-request state.
pub struct ToolRegistry {
    clock: CurrentTimeTool,
    notify: NotificationTool,
}

impl ToolRegistry {
    pub fn new(notify_url: Option<String>, client: Client) -> Self {
        Self {
            clock: CurrentTimeTool,
            notify: NotificationTool::new(client, notify_url),
        }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolName::ALL.into_iter().map(ToolName::definition).collect()
    }

    pub async fn execute(&self, invocation: ToolInvocation) -> ToolOutput {
        match invocation {
            ToolInvocation::GetCurrentTime => self.clock.run(),
            ToolInvocation::SendNotification(input) => self.notify.run(input).await,
        }
    }
}
