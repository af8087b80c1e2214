//! `getCurrentTime` - reads the wall clock

use super::{ToolName, ToolOutput};
use crate::llm::ToolDefinition;
use chrono::{DateTime, Utc};
use serde_json::json;

/// RFC 7231 style, e.g. `Fri, 16 Oct 2026 07:26:00 GMT`
pub const UTC_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub struct CurrentTimeTool;

impl CurrentTimeTool {
    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: ToolName::GetCurrentTime.as_str().to_string(),
            description: "Get the current date and time.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    #[allow(clippy::unused_self)]
    pub fn run(&self) -> ToolOutput {
        ToolOutput::success(format_utc(Utc::now()))
    }
}

pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format(UTC_FORMAT).to_string()
}
