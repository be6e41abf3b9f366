//! SDK Error Types

use tagsvc_core::domain::{Code, Status};
use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with a Structured Error
    #[error("RPC error ({}): {}", .0.code(), .0.message())]
    Rpc(Status),
}

impl SdkError {
    /// Structured Error returned by the server, if any
    pub fn status(&self) -> Option<&Status> {
        match self {
            SdkError::Rpc(status) => Some(status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<Code> {
        self.status().map(Status::code)
    }

    /// Business error code from the first typed detail
    pub fn biz_code(&self) -> Option<i32> {
        self.status()
            .and_then(Status::first_typed_error)
            .map(|err| err.code)
    }
}

impl From<tonic::Status> for SdkError {
    fn from(status: tonic::Status) -> Self {
        SdkError::Rpc(tagsvc_api_rpc::from_grpc_status(&status))
    }
}

impl From<tonic::transport::Error> for SdkError {
    fn from(e: tonic::transport::Error) -> Self {
        SdkError::Connection(e.to_string())
    }
}
