//! Provider payload → [`GenerationResult`].

use super::{FinishReason, GenerationResult};
use serde_json::Value;

/// Extract text, finish reason and token usage from a Gemini-shaped payload.
///
/// Tolerates any shape: missing candidates yield empty text, a missing
/// finish reason means [`FinishReason::Stop`].
pub fn normalize_response(raw: Value) -> GenerationResult {
    let candidate = raw.pointer("/candidates/0");

    let text = candidate
        .and_then(|c| c.pointer("/content/parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .map(|p| p.get("text").and_then(Value::as_str).unwrap_or(""))
                .collect::<String>()
        })
        .unwrap_or_default();

    let finish_reason = match candidate.and_then(|c| c.get("finishReason")).and_then(Value::as_str) {
        None | Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") => FinishReason::Safety,
        Some(_) => FinishReason::Error,
    };

    let tokens_used = raw
        .pointer("/usageMetadata/totalTokenCount")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());

    GenerationResult { text, finish_reason, tokens_used, raw, interrupted: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let result = normalize_response(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Hel"}, {"inlineData": {}}, {"text": "lo"}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 42}
        }));
        assert_eq!(result.text, "Hello");
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.tokens_used, Some(42));
    }

    #[test]
    fn no_candidates_is_empty_stop() {
        let result = normalize_response(json!({}));
        assert_eq!(result.text, "");
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.tokens_used, None);
    }

    #[test]
    fn maps_finish_reasons() {
        let reason = |r: &str| {
            normalize_response(json!({"candidates": [{"finishReason": r}]})).finish_reason
        };
        assert_eq!(reason("MAX_TOKENS"), FinishReason::Length);
        assert_eq!(reason("SAFETY"), FinishReason::Safety);
        assert_eq!(reason("RECITATION"), FinishReason::Error);
    }

    #[test]
    fn keeps_raw_payload() {
        let raw = json!({"candidates": [], "promptFeedback": {"blockReason": "OTHER"}});
        assert_eq!(normalize_response(raw.clone()).raw, raw);
    }

    #[test]
    fn non_object_payload_does_not_panic() {
        let result = normalize_response(json!("unexpected"));
        assert_eq!(result.text, "");
    }
}
