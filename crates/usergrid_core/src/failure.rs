use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a failed user fetch, as surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Network,
    Timeout,
    MalformedPayload,
    NotFound,
    Unauthorized,
    Server { status: u16 },
    Unexpected,
}

impl FailureKind {
    /// Classifies a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => FailureKind::Unauthorized,
            404 => FailureKind::NotFound,
            500..=599 => FailureKind::Server { status },
            _ => FailureKind::Unexpected,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::MalformedPayload => write!(f, "malformed payload"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::Server { status } => write!(f, "server error {status}"),
            FailureKind::Unexpected => write!(f, "unexpected failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Text shown in the error banner. Never includes transport detail.
    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::Network => {
                "Could not reach the server. Check your connection.".to_string()
            }
            FailureKind::Timeout => "The server took too long to respond.".to_string(),
            FailureKind::MalformedPayload => {
                "The server sent data that could not be read.".to_string()
            }
            FailureKind::NotFound => "The user list could not be found.".to_string(),
            FailureKind::Unauthorized => {
                "You are not allowed to view the user list.".to_string()
            }
            FailureKind::Server { status } => {
                format!("The server reported an error (HTTP {status}).")
            }
            FailureKind::Unexpected => "Something unexpected went wrong.".to_string(),
        }
    }

    /// Every category offers a retry; kept as a method so the view model
    /// does not hardcode that.
    pub fn is_retryable(&self) -> bool {
        true
    }
}
