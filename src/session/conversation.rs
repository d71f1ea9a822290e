//! Drives a [`SessionState`] through one LLM round trip at a time.

use super::{SessionState, Status};
use crate::error::StudioError;
use crate::llm::{CancelSignal, LlmClient};
use std::sync::{Mutex, PoisonError};

/// Observer notified after every state change.
pub type UpdateCallback<'a> = &'a (dyn Fn(&SessionState) + Send + Sync);

pub struct Conversation {
    state: SessionState,
    client: LlmClient,
    cancel: CancelSignal,
}

impl Conversation {
    pub fn new(client: LlmClient) -> Self {
        Self { state: SessionState::new(), client, cancel: CancelSignal::new() }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle that aborts the in-flight generation when tripped.
    pub fn cancel_handle(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Send `content` and stream the reply into the session.
    ///
    /// Ends in `Idle` (answered or cancelled) or `Error`.
    pub async fn send(
        &mut self,
        content: &str,
        context: Option<&str>,
        on_update: UpdateCallback<'_>,
    ) -> &SessionState {
        if self.state.send(content).is_none() {
            return &self.state;
        }
        on_update(&self.state);
        self.run(context, on_update).await;
        &self.state
    }

    /// Re-run the last user message after a failure.
    pub async fn retry(&mut self, context: Option<&str>, on_update: UpdateCallback<'_>) -> &SessionState {
        if self.state.retry().is_none() {
            return &self.state;
        }
        self.state.status = Status::Thinking;
        on_update(&self.state);
        self.run(context, on_update).await;
        &self.state
    }

    async fn run(&mut self, context: Option<&str>, on_update: UpdateCallback<'_>) {
        self.cancel.reset();
        let history = self.state.messages.clone();
        let shared = Mutex::new(std::mem::take(&mut self.state));

        let on_delta = |delta: &str| {
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            state.apply_delta(delta);
            on_update(&state);
        };
        let outcome = self.client.stream(&history, context, &on_delta, &self.cancel).await;

        let mut state = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(result) if result.interrupted => {
                tracing::debug!("Generation cancelled");
                state.cancel();
            }
            Ok(result) => {
                if state.partial.is_none() && !result.text.is_empty() {
                    state.apply_delta(&result.text);
                }
                state.complete();
            }
            Err(_) if self.cancel.is_cancelled() => {
                tracing::debug!("Generation cancelled");
                state.cancel();
            }
            Err(e) => {
                tracing::debug!("Generation failed: {}", e);
                state.fail(StudioError::from(e).user_message());
            }
        }
        self.state = state;
        on_update(&self.state);
    }
}
