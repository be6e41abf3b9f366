//! Error Translator
//!
//! Projects a Structured Error onto the HTTP/JSON wire format. The RPC path
//! needs no projection: a [`Status`] maps one-to-one onto a gRPC status.

use crate::domain::{Code, Status};
use serde::{Deserialize, Serialize};

/// Content type declared by the gateway marshaler
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Fixed status-code-family mapping from RPC codes to HTTP status codes
pub fn http_status_from_code(code: Code) -> u16 {
    match code {
        Code::Ok => 200,
        Code::Cancelled => 408,
        Code::Unknown => 500,
        Code::InvalidArgument => 400,
        Code::DeadlineExceeded => 504,
        Code::NotFound => 404,
        Code::AlreadyExists => 409,
        Code::PermissionDenied => 403,
        Code::ResourceExhausted => 429,
        Code::FailedPrecondition => 400,
        Code::Aborted => 409,
        Code::OutOfRange => 400,
        Code::Unimplemented => 501,
        Code::Internal => 500,
        Code::Unavailable => 503,
        Code::DataLoss => 500,
        Code::Unauthenticated => 401,
    }
}

/// HTTP Error Envelope body: `{"code": <int>, "message": <string>}`
///
/// Zero / empty fields are omitted, never emitted as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorBody {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Status line + body for one failed gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: u16,
    pub body: HttpErrorBody,
}

impl HttpError {
    /// Serialized body; falls back to a hand-built document so a body is always written
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|_| {
            format!(
                "{{\"code\":{},\"message\":\"internal error\"}}",
                Code::Internal.as_i32()
            )
        })
    }

    pub fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }
}

/// Project a Structured Error onto the HTTP wire format
///
/// The first typed-error detail (if any) overrides the body code and message;
/// the status line always follows the RPC code.
pub fn to_http_envelope(status: &Status) -> HttpError {
    let mut body = HttpErrorBody {
        code: status.code().as_i32(),
        message: status.message().to_string(),
    };
    if let Some(typed) = status.first_typed_error() {
        body.code = typed.code;
        body.message = typed.message.clone();
    }

    HttpError {
        status: http_status_from_code(status.code()),
        body,
    }
}

/// Same as [`to_http_envelope`] for an arbitrary error; opaque errors become `UNKNOWN`
pub fn error_to_http_envelope(err: &(dyn std::error::Error + 'static)) -> HttpError {
    to_http_envelope(&Status::from_error(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{errcode, Detail, TypedError};

    const ALL_CODES: [Code; 17] = [
        Code::Ok,
        Code::Cancelled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
    ];

    #[test]
    fn test_first_typed_detail_overrides_body() {
        let status = Status::not_found("tag missing")
            .with_detail(Detail::Error(TypedError::new(40401, "no such tag")));

        let envelope = to_http_envelope(&status);
        assert_eq!(envelope.status, 404);
        assert_eq!(envelope.to_json(), r#"{"code":40401,"message":"no such tag"}"#);
    }

    #[test]
    fn test_only_first_typed_detail_wins() {
        let status = Status::new(Code::AlreadyExists, "dup")
            .with_detail(Detail::Unrecognized {
                type_url: "type.googleapis.com/google.rpc.RetryInfo".into(),
                value: vec![],
            })
            .with_detail(Detail::Error(TypedError::new(1, "first")))
            .with_detail(Detail::Error(TypedError::new(2, "second")));

        let envelope = to_http_envelope(&status);
        assert_eq!(envelope.status, 409);
        assert_eq!(envelope.body, HttpErrorBody { code: 1, message: "first".into() });
    }

    #[test]
    fn test_without_typed_detail_uses_status_fields() {
        let status = Status::new(Code::PermissionDenied, "nope");
        let envelope = to_http_envelope(&status);
        assert_eq!(envelope.status, 403);
        assert_eq!(envelope.body.code, 7);
        assert_eq!(envelope.body.message, "nope");
    }

    #[test]
    fn test_zero_and_empty_fields_are_omitted() {
        let envelope = to_http_envelope(&Status::new(Code::Ok, ""));
        assert_eq!(envelope.to_json(), "{}");

        let envelope = to_http_envelope(&Status::new(Code::Ok, "fine"));
        assert_eq!(envelope.to_json(), r#"{"message":"fine"}"#);
    }

    #[test]
    fn test_every_code_maps_and_serializes() {
        for code in ALL_CODES {
            let envelope = to_http_envelope(&Status::new(code, "m"));
            assert!((200..600).contains(&envelope.status));
            let parsed: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
            assert!(parsed.is_object());
        }
    }

    #[test]
    fn test_status_table() {
        assert_eq!(http_status_from_code(Code::Cancelled), 408);
        assert_eq!(http_status_from_code(Code::DeadlineExceeded), 504);
        assert_eq!(http_status_from_code(Code::ResourceExhausted), 429);
        assert_eq!(http_status_from_code(Code::FailedPrecondition), 400);
        assert_eq!(http_status_from_code(Code::Unimplemented), 501);
        assert_eq!(http_status_from_code(Code::Unavailable), 503);
        assert_eq!(http_status_from_code(Code::Unauthenticated), 401);
        assert_eq!(http_status_from_code(Code::from_i32(42)), 500);
    }

    #[test]
    fn test_opaque_error_is_unknown() {
        let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let envelope = error_to_http_envelope(&err);
        assert_eq!(envelope.status, 500);
        assert_eq!(envelope.body.code, Code::Unknown.as_i32());
        assert_eq!(envelope.body.message, "pipe closed");
    }

    #[test]
    fn test_business_error_surfaces_biz_code() {
        let envelope = to_http_envelope(&errcode::INVALID_PARAMS.with_message("page must be positive"));
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.body.code, 10000001);
        assert_eq!(envelope.body.message, "page must be positive");
        assert_eq!(envelope.content_type(), "application/json");
    }
}
