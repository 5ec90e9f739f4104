use thiserror::Error;

/// Failure talking to the completion service.
///
/// The relay logs these and carries on; they are never surfaced as hard errors.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}
