//! Processing state of background vocabulary imports.
//!
//! While a quiz is being filled by an import job its entity set is
//! incomplete, so practice on it is refused until the job settles.

use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing status of a quiz's import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Cancelled,
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self::Completed
    }
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the job has stopped and will not change the quiz again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Processing)
    }

    /// Whether practice may start on a quiz in this state.
    pub fn allows_practice(&self) -> bool {
        *self == Self::Completed
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known state of an import job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub status: ProcessingStatus,
    #[serde(default)]
    pub message: String,
}

impl ImportProgress {
    pub fn new(status: ProcessingStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Source of import job state for a quiz.
#[async_trait]
pub trait ImportSource: Send + Sync {
    /// Current status and progress message of the quiz's import job.
    async fn fetch_progress(&self, quiz_id: i64) -> Result<ImportProgress, ServiceError>;

    /// Ask the job to stop. Only meaningful while the job is not terminal.
    async fn cancel(&self, quiz_id: i64) -> Result<(), ServiceError>;
}
