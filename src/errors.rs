use std::result::Result as StdResult;

use thiserror::Error;

use crate::domain::PurchaseId;

/// Unified error type for the domain, storage and configuration layers.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Purchase not found: {0}")]
    PurchaseNotFound(PurchaseId),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, SplitError>;

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SplitError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for SplitError {
    fn from(err: std::io::Error) -> Self {
        SplitError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for SplitError {
    fn from(err: serde_json::Error) -> Self {
        SplitError::StorageError(err.to_string())
    }
}
