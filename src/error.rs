//! Typed errors shared by the tree, fetch and LLM layers
//!
//! Library code returns [`StudioError`] so callers can pick a user-facing
//! message per failure mode instead of matching on strings. The CLI wraps
//! these in `anyhow` at the command boundary.

use thiserror::Error;

pub type StudioResult<T> = std::result::Result<T, StudioError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StudioError {
    /// Repository or file does not exist (HTTP 404), or is private.
    #[error("Not found: {0}")]
    NotFound(String),

    /// GitHub or LLM quota exhausted (HTTP 403 on GitHub, 429 anywhere).
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// File exceeds the size the contents API will return.
    #[error("Too large: {0}")]
    TooLarge(String),

    /// Connection refused, DNS failure, timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or rejected API credentials.
    #[error("Unauthorized: {0}")]
    Auth(String),

    /// Generation blocked by the model's safety filters.
    #[error("Blocked by safety filters: {0}")]
    Safety(String),

    /// Caller passed something unusable (bad URL, empty code, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unknown(String),
}

impl StudioError {
    /// A message describing the likely cause, suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            StudioError::NotFound(detail) => format!(
                "{detail}. Please check the URL and ensure the repository is public."
            ),
            StudioError::RateLimited(_) => "GitHub or model API rate limit exceeded. Set GITHUB_TOKEN \
                 to make authenticated requests, or try again later."
                .to_string(),
            StudioError::TooLarge(detail) => {
                format!("{detail}. Files larger than 1MB cannot be loaded.")
            }
            StudioError::Network(detail) => {
                format!("Network problem ({detail}). This is usually transient; please retry.")
            }
            StudioError::Auth(_) => {
                "The API rejected the credentials. Check GEMINI_API_KEY / GITHUB_TOKEN.".to_string()
            }
            StudioError::Safety(_) => {
                "The model declined to answer because of its safety filters.".to_string()
            }
            StudioError::InvalidInput(detail) => detail.clone(),
            StudioError::Unknown(detail) => format!("Unexpected error: {detail}"),
        }
    }

    /// Whether retrying the same request later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StudioError::RateLimited(_) | StudioError::Network(_))
    }

    /// Map a non-success GitHub HTTP status into the taxonomy.
    pub fn from_github_status(status: u16, what: &str, body: &str) -> Self {
        match status {
            401 => StudioError::Auth(format!("GitHub rejected the token while fetching {what}")),
            403 | 429 => StudioError::RateLimited(format!("GitHub refused {what} ({status})")),
            404 => StudioError::NotFound(format!("{what} not found")),
            422 if body.contains("too_large") => {
                StudioError::TooLarge(format!("{what} is too large to fetch"))
            }
            _ => StudioError::Unknown(format!("GitHub returned {status} for {what}: {body}")),
        }
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StudioError::Network(format!("request timeout: {e}"))
        } else if e.is_connect() {
            StudioError::Network(format!("connection failed: {e}"))
        } else if e.is_decode() {
            StudioError::Unknown(format!("unexpected response body: {e}"))
        } else {
            StudioError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_status_mapping() {
        assert!(matches!(
            StudioError::from_github_status(404, "repository o/r", ""),
            StudioError::NotFound(_)
        ));
        assert!(matches!(
            StudioError::from_github_status(403, "repository o/r", ""),
            StudioError::RateLimited(_)
        ));
        assert!(matches!(
            StudioError::from_github_status(422, "src/big.bin", r#"{"errors":[{"code":"too_large"}]}"#),
            StudioError::TooLarge(_)
        ));
        assert!(matches!(
            StudioError::from_github_status(422, "src/x", "validation"),
            StudioError::Unknown(_)
        ));
    }

    #[test]
    fn user_messages_name_the_cause() {
        let msg = StudioError::RateLimited("403".into()).user_message();
        assert!(msg.contains("GITHUB_TOKEN"));

        let msg = StudioError::NotFound("Repository o/r".into()).user_message();
        assert!(msg.contains("public"));

        let msg = StudioError::InvalidInput("Please enter a repository URL.".into()).user_message();
        assert_eq!(msg, "Please enter a repository URL.");
    }

    #[test]
    fn retryable_kinds() {
        assert!(StudioError::Network("timeout".into()).is_retryable());
        assert!(!StudioError::TooLarge("x".into()).is_retryable());
    }

    #[test]
    fn converts_to_anyhow() {
        let err: anyhow::Error = StudioError::Auth("bad key".into()).into();
        assert!(err.to_string().contains("Unauthorized"));
    }
}
