//! LLM access: prompt construction, response normalization, error
//! classification and the provider adapters behind them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod client;
pub mod error;
pub mod flows;
pub mod gemini;
pub mod normalize;
pub mod prompt;

pub use client::LlmClient;
pub use error::{classify, AiError, ErrorKind};
pub use gemini::GeminiAdapter;
pub use normalize::normalize_response;
pub use prompt::{build_prompt, MAX_CONTEXT_MESSAGES, SYSTEM_PRIMER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One generation call. `None` fields fall back to the client defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub context: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Messages the adapter renders into its prompt; its own default when `None`.
    pub history_window: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Stop,
    Length,
    Safety,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub text: String,
    pub finish_reason: FinishReason,
    pub tokens_used: Option<u32>,
    /// Provider payload as received (last chunk when streaming).
    pub raw: serde_json::Value,
    /// The stream stopped on cancellation before the provider finished.
    pub interrupted: bool,
}

/// Cooperative cancellation flag shared between a caller and an in-flight
/// generation.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Callback receiving streamed text fragments in arrival order.
pub type DeltaCallback<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// A text-generation backend.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, AiError>;

    /// Stream a generation, calling `on_delta` for each fragment.
    ///
    /// When `cancel` trips, returns early with the text received so far and
    /// `interrupted` set.
    /// Adapters without native streaming emit the whole text as one delta.
    async fn stream(
        &self,
        request: &GenerationRequest,
        on_delta: DeltaCallback<'_>,
        cancel: &CancelSignal,
    ) -> Result<GenerationResult, AiError> {
        let result = self.generate(request).await?;
        if !cancel.is_cancelled() && !result.text.is_empty() {
            on_delta(&result.text);
        }
        Ok(result)
    }
}
