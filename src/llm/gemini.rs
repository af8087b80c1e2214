//! Google Gemini provider implementation
//!
//! Speaks the `generateContent` REST API with function calling.

use super::types::{ContentBlock, LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    url: String,
    model_id: String,
}

impl GeminiService {
    pub fn new(client: Client, api_key: String, model: &str, base_url: &str) -> Self {
        let url = format!(
            "{}/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );

        Self {
            client,
            api_key,
            url,
            model_id: model.to_string(),
        }
    }
}

pub(super) fn translate_request(request: &LlmRequest) -> GeminiRequest {
    let mut contents = Vec::new();

    for msg in &request.messages {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        };

        let parts: Vec<GeminiPart> = msg
            .content
            .iter()
            .filter_map(|block| match block {
                // Gemini rejects parts with no data
                ContentBlock::Text { text } if text.is_empty() => None,
                ContentBlock::Text { text } => Some(GeminiPart::Text { text: text.clone() }),
                ContentBlock::ToolUse {
                    id: _,
                    name,
                    input,
                    thought_signature,
                } => Some(GeminiPart::FunctionCall {
                    function_call: GeminiFunctionCall {
                        id: None,
                        name: name.clone(),
                        args: input.clone(),
                    },
                    thought_signature: thought_signature.clone(),
                }),
                ContentBlock::ToolResult {
                    name,
                    content,
                    is_error,
                } => {
                    let mut response = serde_json::json!({ "content": content });
                    if *is_error {
                        response["error"] = serde_json::Value::Bool(true);
                    }
                    Some(GeminiPart::FunctionResponse {
                        function_response: GeminiFunctionResponse {
                            name: name.clone(),
                            response,
                        },
                    })
                }
            })
            .collect();

        if !parts.is_empty() {
            contents.push(GeminiContent {
                role: Some(role.to_string()),
                parts,
            });
        }
    }

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(vec![GeminiTool {
            function_declarations: request
                .tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.input_schema.clone(),
                })
                .collect(),
        }])
    };

    GeminiRequest { contents, tools }
}

pub(super) fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, LlmError> {
    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::unknown("No candidates in response"))?;

    let Some(body) = candidate.content else {
        return Err(LlmError::unknown(format!(
            "Candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    };

    let mut content = Vec::new();

    for (index, part) in body.parts.into_iter().enumerate() {
        match part {
            GeminiPart::Text { text } => {
                if !text.is_empty() {
                    content.push(ContentBlock::Text { text });
                }
            }
            GeminiPart::FunctionCall {
                function_call,
                thought_signature,
            } => {
                if function_call.name.is_empty() {
                    return Err(LlmError::unknown("Function call with empty name"));
                }
                let id = function_call
                    .id
                    .unwrap_or_else(|| format!("call_{index}_{}", function_call.name));
                content.push(ContentBlock::ToolUse {
                    id,
                    name: function_call.name,
                    input: function_call.args,
                    thought_signature,
                });
            }
            GeminiPart::FunctionResponse { .. } | GeminiPart::Other(_) => {}
        }
    }

    let end_turn = candidate.finish_reason.is_some_and(|r| r == "STOP");

    Ok(LlmResponse {
        content,
        end_turn,
        usage: Usage {
            input_tokens: u64::from(resp.usage_metadata.prompt_token_count),
            output_tokens: u64::from(resp.usage_metadata.candidates_token_count),
        },
    })
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = translate_request(request);

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map_or(body, |error_resp| error_resp.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(super) enum GeminiPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
        #[serde(
            rename = "thoughtSignature",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        thought_signature: Option<String>,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
    /// Part kinds we neither send nor act on (inline data, code execution, ...)
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeminiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeminiFunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiTool {
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
pub(super) struct GeminiFunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub usage_metadata: GeminiUsageMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
