//! High-level generation client shared by chat and the analysis flows.

use super::error::{AiError, ErrorKind};
use super::gemini::GeminiAdapter;
use super::{CancelSignal, ChatMessage, DeltaCallback, FinishReason, GenerationRequest, GenerationResult, LlmAdapter};
use crate::domain::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct LlmClient {
    adapter: Arc<dyn LlmAdapter>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    history_window: usize,
}

impl LlmClient {
    pub fn new(adapter: Arc<dyn LlmAdapter>, config: &Config) -> Self {
        Self {
            adapter,
            model: config.model.clone(),
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
            history_window: config.history_window,
        }
    }

    /// Client backed by the Gemini REST API.
    pub fn from_config(config: &Config) -> Result<Self, AiError> {
        Ok(Self::new(Arc::new(GeminiAdapter::new(config)?), config))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, messages: &[ChatMessage], context: Option<&str>) -> GenerationRequest {
        let start = messages.len().saturating_sub(self.history_window);
        GenerationRequest {
            model: Some(self.model.clone()),
            messages: messages[start..].to_vec(),
            context: context.map(str::to_string),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            history_window: Some(self.history_window),
        }
    }

    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        context: Option<&str>,
    ) -> Result<GenerationResult, AiError> {
        let result = self.adapter.generate(&self.request(messages, context)).await?;
        check_blocked(result)
    }

    pub async fn stream(
        &self,
        messages: &[ChatMessage],
        context: Option<&str>,
        on_delta: DeltaCallback<'_>,
        cancel: &CancelSignal,
    ) -> Result<GenerationResult, AiError> {
        let request = self.request(messages, context);
        tracing::debug!(
            "Streaming from {} ({} messages, model {})",
            self.adapter.name(),
            request.messages.len(),
            self.model
        );
        let result = self.adapter.stream(&request, on_delta, cancel).await?;
        check_blocked(result)
    }

    /// Single-turn completion of `prompt`, returning the text.
    pub async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let result = self.generate(&[ChatMessage::user(prompt)], None).await?;
        if result.finish_reason == FinishReason::Length {
            tracing::warn!("Response truncated at {} output tokens", self.max_tokens);
        }
        Ok(result.text)
    }
}

/// A safety stop with no text is a failure, not an empty answer.
fn check_blocked(result: GenerationResult) -> Result<GenerationResult, AiError> {
    if result.finish_reason == FinishReason::Safety && result.text.trim().is_empty() {
        return Err(AiError::new(ErrorKind::Safety, "response blocked by safety filters"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedAdapter;

    #[tokio::test]
    async fn trims_history_to_configured_window() {
        let adapter = Arc::new(ScriptedAdapter::text("ok"));
        let config = Config { history_window: 3, ..Config::default() };
        let client = LlmClient::new(adapter.clone(), &config);

        let messages: Vec<ChatMessage> = (0..5).map(|i| ChatMessage::user(format!("m{i}"))).collect();
        client.generate(&messages, Some("ctx")).await.unwrap();

        let requests = adapter.requests.lock().unwrap();
        let sent = &requests[0];
        assert_eq!(sent.messages.len(), 3);
        assert_eq!(sent.messages[0].content, "m2");
        assert_eq!(sent.context.as_deref(), Some("ctx"));
        assert_eq!(sent.model.as_deref(), Some("gemini-1.5-flash"));
        assert_eq!(sent.history_window, Some(3));
    }

    #[tokio::test]
    async fn complete_returns_text() {
        let client = LlmClient::new(Arc::new(ScriptedAdapter::text("answer")), &Config::default());
        assert_eq!(client.complete("question").await.unwrap(), "answer");
    }

    #[test]
    fn empty_safety_stop_is_error() {
        let blocked = GenerationResult {
            text: String::new(),
            finish_reason: FinishReason::Safety,
            tokens_used: None,
            raw: serde_json::Value::Null,
            interrupted: false,
        };
        assert_eq!(check_blocked(blocked).unwrap_err().kind, ErrorKind::Safety);
    }
}
