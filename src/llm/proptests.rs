//! Property-based tests for the Gemini translation layer
//!
//! These verify that translation between our internal types and the wire
//! format preserves key invariants:
//! - Empty text is never sent, and messages left with no parts are skipped
//! - Roles map user -> "user", assistant -> "model"
//! - Text is preserved in order
//! - Every function call in a response surfaces as a tool use, in order

use super::gemini::{
    normalize_response, translate_request, GeminiCandidate, GeminiContent, GeminiFunctionCall,
    GeminiPart, GeminiResponse, GeminiUsageMetadata,
};
use super::types::{ContentBlock, LlmMessage, LlmRequest, MessageRole};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_text_block() -> impl Strategy<Value = ContentBlock> {
    "[a-zA-Z0-9 _.!?,]{0,60}".prop_map(|text| ContentBlock::Text { text })
}

fn arb_role() -> impl Strategy<Value = MessageRole> {
    prop_oneof![Just(MessageRole::User), Just(MessageRole::Assistant)]
}

/// Messages with zero or more text blocks
fn arb_message() -> impl Strategy<Value = LlmMessage> {
    (arb_role(), prop::collection::vec(arb_text_block(), 0..4))
        .prop_map(|(role, content)| LlmMessage { role, content })
}

fn arb_tool_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,20}"
}

fn response_with_parts(parts: Vec<GeminiPart>) -> GeminiResponse {
    GeminiResponse {
        candidates: vec![GeminiCandidate {
            content: Some(GeminiContent {
                role: Some("model".to_string()),
                parts,
            }),
            finish_reason: Some("STOP".to_string()),
        }],
        usage_metadata: GeminiUsageMetadata::default(),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn translate_skips_empty_messages_and_maps_roles(
        messages in prop::collection::vec(arb_message(), 0..8)
    ) {
        let request = LlmRequest { messages: messages.clone(), tools: vec![] };
        let wire = translate_request(&request);

        let sent: Vec<&LlmMessage> = messages
            .iter()
            .filter(|m| {
                m.content
                    .iter()
                    .any(|b| !matches!(b, ContentBlock::Text { text } if text.is_empty()))
            })
            .collect();
        prop_assert_eq!(wire.contents.len(), sent.len());

        for (content, msg) in wire.contents.iter().zip(sent) {
            prop_assert!(!content.parts.is_empty());
            let expected = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            prop_assert_eq!(content.role.as_deref(), Some(expected));

            let texts: Vec<&str> = content
                .parts
                .iter()
                .filter_map(|p| match p {
                    GeminiPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            prop_assert!(texts.iter().all(|t| !t.is_empty()));
            let expected_texts: Vec<&str> = msg
                .content
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            prop_assert_eq!(texts, expected_texts);
        }
    }

    #[test]
    fn normalize_surfaces_every_function_call_in_order(
        names in prop::collection::vec(arb_tool_name(), 0..5),
        leading_text in proptest::option::of("[a-z ]{1,20}")
    ) {
        let mut parts = Vec::new();
        if let Some(text) = leading_text.clone() {
            parts.push(GeminiPart::Text { text });
        }
        for name in &names {
            parts.push(GeminiPart::FunctionCall {
                function_call: GeminiFunctionCall {
                    id: None,
                    name: name.clone(),
                    args: serde_json::json!({}),
                },
                thought_signature: None,
            });
        }

        let normalized = normalize_response(response_with_parts(parts)).unwrap();
        let called: Vec<String> = normalized
            .tool_uses()
            .into_iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(called, names);
        prop_assert_eq!(normalized.text(), leading_text.unwrap_or_default());
    }
}
