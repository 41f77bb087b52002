//! Errors raised while setting up or driving the practice client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
