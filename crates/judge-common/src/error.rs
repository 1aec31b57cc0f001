//! Error types shared by the scraping and evaluation clients.
//!
//! Each failure cause is its own variant so callers can branch on it instead of
//! matching on message text. Binary crates wrap `JudgeError` via `#[from]`.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// The request never completed, or the service answered with a non-success status.
    #[error("transport error: {message}")]
    Transport {
        status: Option<StatusCode>,
        message: String,
    },

    /// The service answered normally but reported a failure in its payload.
    #[error("service error: {0}")]
    Service(String),

    /// The model output could not be decoded into a valid evaluation.
    #[error("failed to generate valid evaluation")]
    Parse,
}

impl JudgeError {
    pub(crate) fn status(status: StatusCode, message: impl Into<String>) -> Self {
        JudgeError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for JudgeError {
    fn from(e: reqwest::Error) -> Self {
        JudgeError::Transport {
            status: e.status(),
            message: e.to_string(),
        }
    }
}

/// Human-readable reason phrase for a status, e.g. "Internal Server Error".
pub(crate) fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
