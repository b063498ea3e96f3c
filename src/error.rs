//! Query client error types

use strum::Display;
use thiserror::Error;

/// Failure of a single ask request
#[derive(Debug, Error)]
pub enum AskError {
    /// Backend answered with a non-success HTTP status
    #[error("backend error: {status}")]
    Status { status: u16 },

    /// DNS, connect, or I/O failure before a complete response arrived
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Success status but the body is not JSON
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl AskError {
    pub fn kind(&self) -> AskErrorKind {
        match self {
            AskError::Status { .. } => AskErrorKind::Status,
            AskError::Transport(_) => AskErrorKind::Transport,
            AskError::Decode(_) => AskErrorKind::Decode,
        }
    }

    /// Numeric status code, when the backend produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            AskError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// Error classification, for callers that need to tell failures apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AskErrorKind {
    Status,
    Transport,
    Decode,
}
