//! Error types for practice-core.

use crate::import::ProcessingStatus;
use thiserror::Error;

/// Result type alias using PracticeError.
pub type Result<T> = std::result::Result<T, PracticeError>;

/// Failures reported by the practice service collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

/// Errors raised by practice sessions and the practice store.
#[derive(Debug, Error)]
pub enum PracticeError {
    #[error("service request failed: {0}")]
    Service(#[from] ServiceError),

    #[error("cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("invalid rating {0}, expected 1-4")]
    InvalidRating(u8),

    #[error("quiz {0} not found")]
    QuizNotFound(i64),

    #[error("quiz {quiz_id} cannot be practiced while {status}")]
    PracticeUnavailable {
        quiz_id: i64,
        status: ProcessingStatus,
    },
}

impl PracticeError {
    /// Whether the failed command can be re-issued unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Service(ServiceError::Network(_))
                | Self::Service(ServiceError::Backend { status: 500..=599, .. })
        )
    }
}
