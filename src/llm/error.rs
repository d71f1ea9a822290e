//! Classification of LLM failures

use crate::error::StudioError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

static AUTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"401|403").expect("valid regex"));
static RATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"429").expect("valid regex"));
static SAFETY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)safety").expect("valid regex"));
static NETWORK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)network|fetch|timeout").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    RateLimit,
    Network,
    Safety,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Auth => "AUTH",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::Network => "NETWORK",
            ErrorKind::Safety => "SAFETY",
            ErrorKind::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Bucket a failure by HTTP status when known, else by message text.
pub fn classify(message: &str, status: Option<u16>) -> ErrorKind {
    match status {
        Some(401 | 403) => return ErrorKind::Auth,
        Some(429) => return ErrorKind::RateLimit,
        _ => {}
    }
    if AUTH_RE.is_match(message) {
        ErrorKind::Auth
    } else if RATE_RE.is_match(message) {
        ErrorKind::RateLimit
    } else if SAFETY_RE.is_match(message) {
        ErrorKind::Safety
    } else if NETWORK_RE.is_match(message) {
        ErrorKind::Network
    } else {
        ErrorKind::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AiError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl AiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), status: None }
    }

    /// Non-success HTTP response from a provider.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}: {body}");
        Self { kind: classify(&message, Some(status)), message, status: Some(status) }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() || e.is_connect() || e.is_request() {
            ErrorKind::Network
        } else {
            classify(&e.to_string(), e.status().map(|s| s.as_u16()))
        };
        Self { kind, message: e.to_string(), status: e.status().map(|s| s.as_u16()) }
    }
}

impl From<AiError> for StudioError {
    fn from(e: AiError) -> Self {
        match e.kind {
            ErrorKind::Auth => StudioError::Auth(e.message),
            ErrorKind::RateLimit => StudioError::RateLimited(e.message),
            ErrorKind::Network => StudioError::Network(e.message),
            ErrorKind::Safety => StudioError::Safety(e.message),
            ErrorKind::Unknown => StudioError::Unknown(e.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_takes_precedence() {
        assert_eq!(classify("anything", Some(401)), ErrorKind::Auth);
        assert_eq!(classify("anything", Some(403)), ErrorKind::Auth);
        assert_eq!(classify("network down", Some(429)), ErrorKind::RateLimit);
    }

    #[test]
    fn message_patterns() {
        assert_eq!(classify("Request failed with 401", None), ErrorKind::Auth);
        assert_eq!(classify("got 429 Too Many Requests", None), ErrorKind::RateLimit);
        assert_eq!(classify("Blocked by SAFETY settings", None), ErrorKind::Safety);
        assert_eq!(classify("failed to fetch", None), ErrorKind::Network);
        assert_eq!(classify("Timeout while reading", None), ErrorKind::Network);
        assert_eq!(classify("something odd", None), ErrorKind::Unknown);
        assert_eq!(classify("", None), ErrorKind::Unknown);
    }

    #[test]
    fn from_status_keeps_body() {
        let err = AiError::from_status(500, "internal");
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.status, Some(500));
        assert!(err.to_string().contains("internal"));
    }

    #[test]
    fn converts_into_studio_error() {
        let err: StudioError = AiError::new(ErrorKind::Safety, "blocked").into();
        assert!(matches!(err, StudioError::Safety(_)));
        let err: StudioError = AiError::new(ErrorKind::RateLimit, "slow down").into();
        assert!(err.is_retryable());
    }
}
