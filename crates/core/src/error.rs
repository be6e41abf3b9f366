// Central Error Type for the Application

use crate::domain::{errcode, Status};
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Project onto the RPC status model through the business error catalog
    ///
    /// Storage and internal failures keep their detail out of the client-facing message.
    pub fn to_status(&self) -> Status {
        match self {
            AppError::Domain(e) => errcode::INVALID_PARAMS.with_message(e.to_string()),
            AppError::Validation(msg) => errcode::INVALID_PARAMS.with_message(msg.clone()),
            AppError::Serialization(e) => errcode::INVALID_PARAMS.with_message(e.to_string()),
            AppError::NotFound(msg) => errcode::NOT_FOUND.with_message(msg.clone()),
            AppError::Conflict(msg) => errcode::TAG_ALREADY_EXISTS.with_message(msg.clone()),
            AppError::Database(_) | AppError::Io(_) | AppError::Config(_) | AppError::Internal(_) => {
                errcode::SERVER_ERROR.to_status()
            }
        }
    }
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        err.to_status()
    }
}
