//! Chat session: message history, streaming partial text and status.

use crate::llm::ChatMessage;
use serde::Serialize;
use std::fmt;

pub mod conversation;

pub use conversation::Conversation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Thinking,
    Streaming,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Idle => "idle",
            Status::Thinking => "thinking",
            Status::Streaming => "streaming",
            Status::Error => "error",
        };
        f.write_str(s)
    }
}

/// `idle → thinking → streaming → idle` on success; any failure moves to
/// `error` and drops the partial answer. Nothing here guards against a second
/// `send` while one is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub messages: Vec<ChatMessage>,
    pub status: Status,
    pub partial: Option<String>,
    pub error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message and start thinking. Blank input is ignored.
    pub fn send(&mut self, content: &str) -> Option<&ChatMessage> {
        if content.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(content));
        self.status = Status::Thinking;
        self.error = None;
        self.partial = None;
        self.messages.last()
    }

    pub fn apply_delta(&mut self, delta: &str) {
        self.partial.get_or_insert_with(String::new).push_str(delta);
        self.status = Status::Streaming;
    }

    /// Commit the partial answer (if any) as an assistant message.
    pub fn complete(&mut self) {
        if let Some(partial) = self.partial.take().filter(|p| !p.is_empty()) {
            self.messages.push(ChatMessage::assistant(partial));
        }
        self.status = Status::Idle;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.partial = None;
        self.error = Some(message.into());
        self.status = Status::Error;
    }

    pub fn cancel(&mut self) {
        self.partial = None;
        self.status = Status::Idle;
    }

    /// Leave the error state. Returns the user message to re-send, if any.
    pub fn retry(&mut self) -> Option<String> {
        if self.status != Status::Error {
            return None;
        }
        self.error = None;
        self.status = Status::Idle;
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::llm::Role::User)
            .map(|m| m.content.clone())
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, Status::Thinking | Status::Streaming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn streaming_success_commits_one_message() {
        let mut state = SessionState::new();
        state.send("hi");
        assert_eq!(state.status, Status::Thinking);

        state.apply_delta("Hel");
        assert_eq!(state.status, Status::Streaming);
        state.apply_delta("lo");
        state.complete();

        assert_eq!(state.status, Status::Idle);
        assert_eq!(state.partial, None);
        let assistant: Vec<&ChatMessage> =
            state.messages.iter().filter(|m| m.role == Role::Assistant).collect();
        assert_eq!(assistant.len(), 1);
        assert_eq!(assistant[0].content, "Hello");
    }

    #[test]
    fn failure_discards_partial() {
        let mut state = SessionState::new();
        state.send("hi");
        state.apply_delta("Hal");
        state.fail("network down");

        assert_eq!(state.status, Status::Error);
        assert_eq!(state.error.as_deref(), Some("network down"));
        assert_eq!(state.partial, None);
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn cancel_returns_to_idle_without_commit() {
        let mut state = SessionState::new();
        state.send("hi");
        state.apply_delta("partial");
        state.cancel();
        assert_eq!(state.status, Status::Idle);
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn empty_completion_adds_nothing() {
        let mut state = SessionState::new();
        state.send("hi");
        state.complete();
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn retry_only_from_error() {
        let mut state = SessionState::new();
        assert_eq!(state.retry(), None);

        state.send("first");
        state.fail("boom");
        assert_eq!(state.retry().as_deref(), Some("first"));
        assert_eq!(state.status, Status::Idle);
        assert_eq!(state.error, None);
    }

    #[test]
    fn blank_send_is_ignored() {
        let mut state = SessionState::new();
        assert!(state.send("   ").is_none());
        assert!(state.messages.is_empty());
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn send_clears_previous_error() {
        let mut state = SessionState::new();
        state.send("a");
        state.fail("x");
        state.send("b");
        assert_eq!(state.error, None);
        assert!(state.is_busy());
    }
}
