//! Typed errors for the storage, repository, and remote layers.
//!
//! The habit aggregation engine has no error type: malformed memo content is
//! skipped, never rejected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VibitsError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("memo not found: {0}")]
    NotFound(String),
    #[error("remote request failed: {0}")]
    Remote(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("serialization failure: {0}")]
    Serialization(String),
    #[error("io failure: {0}")]
    Io(String),
}

impl From<std::io::Error> for VibitsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for VibitsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<serde_json::Error> for VibitsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

impl From<reqwest::Error> for VibitsError {
    fn from(value: reqwest::Error) -> Self {
        Self::Remote(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VibitsError>;
