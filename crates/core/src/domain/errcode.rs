// Business Error Codes
//
// Stable numeric codes shown to HTTP clients. Each maps onto an RPC status code
// and travels to the client as the first typed detail of the status.

use crate::domain::status::{Code, Detail, Status, TypedError};
use std::fmt;

/// Business error: stable code + default message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BizError {
    code: i32,
    message: &'static str,
}

impl BizError {
    pub const fn new(code: i32, message: &'static str) -> Self {
        Self { code, message }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    /// RPC status code for this business error
    pub fn rpc_code(&self) -> Code {
        to_rpc_code(*self)
    }

    /// Build a status whose first typed detail is this error
    pub fn to_status(&self) -> Status {
        to_status(*self, self.message)
    }

    /// Same as `to_status` but with a call-specific message on the typed detail
    pub fn with_message(&self, message: impl Into<String>) -> Status {
        to_status(*self, message)
    }
}

impl fmt::Display for BizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {}, message: {}", self.code, self.message)
    }
}

pub const SUCCESS: BizError = BizError::new(0, "success");
pub const SERVER_ERROR: BizError = BizError::new(10000000, "internal server error");
pub const INVALID_PARAMS: BizError = BizError::new(10000001, "invalid parameters");
pub const UNAUTHORIZED: BizError = BizError::new(10000002, "unauthorized");
pub const NOT_FOUND: BizError = BizError::new(10000003, "not found");
pub const UNKNOWN: BizError = BizError::new(10000004, "unknown error");
pub const DEADLINE_EXCEEDED: BizError = BizError::new(10000005, "deadline exceeded");
pub const ACCESS_DENIED: BizError = BizError::new(10000006, "access denied");
pub const LIMIT_EXCEEDED: BizError = BizError::new(10000007, "limit exceeded");
pub const METHOD_NOT_ALLOWED: BizError = BizError::new(10000008, "method not allowed");

pub const GET_TAG_LIST_FAIL: BizError = BizError::new(20010001, "failed to get tag list");
pub const GET_TAG_FAIL: BizError = BizError::new(20010002, "failed to get tag");
pub const TAG_NOT_FOUND: BizError = BizError::new(20010003, "tag not found");
pub const CREATE_TAG_FAIL: BizError = BizError::new(20010004, "failed to create tag");
pub const TAG_ALREADY_EXISTS: BizError = BizError::new(20010005, "tag already exists");

/// Map a business error onto an RPC status code
pub fn to_rpc_code(err: BizError) -> Code {
    match err.code {
        0 => Code::Ok,
        10000000 => Code::Internal,
        10000001 => Code::InvalidArgument,
        10000002 => Code::Unauthenticated,
        10000003 | 20010003 => Code::NotFound,
        10000005 => Code::DeadlineExceeded,
        10000006 => Code::PermissionDenied,
        10000007 => Code::ResourceExhausted,
        10000008 => Code::Unimplemented,
        20010005 => Code::AlreadyExists,
        _ => Code::Unknown,
    }
}

/// Status with the RPC code of `err` and `err` as the first typed detail
pub fn to_status(err: BizError, message: impl Into<String>) -> Status {
    let message = message.into();
    Status::new(to_rpc_code(err), message.clone())
        .with_detail(Detail::Error(TypedError::new(err.code, message)))
}
