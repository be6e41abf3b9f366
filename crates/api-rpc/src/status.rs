// Structured Error <-> gRPC status
//
// Details travel as an encoded `google.rpc.Status` in `grpc-status-details-bin`.
// Typed errors become `tag_service.Error`; unrecognized records pass through as-is.

use crate::proto::{self, RpcStatus};
use bytes::Bytes;
use prost::Message as _;
use tagsvc_core::domain::{Code, Detail, Status, TypedError};

/// Native gRPC projection of a Structured Error
pub fn to_grpc_status(status: &Status) -> tonic::Status {
    let code = tonic::Code::from_i32(status.code().as_i32());
    if status.details().is_empty() {
        return tonic::Status::new(code, status.message());
    }

    let payload = RpcStatus {
        code: status.code().as_i32(),
        message: status.message().to_string(),
        details: status.details().iter().map(detail_to_any).collect(),
    };
    tonic::Status::with_details(code, status.message(), Bytes::from(payload.encode_to_vec()))
}

/// Rebuild a Structured Error from a gRPC status (client side)
///
/// Undecodable detail bytes are dropped; code and message always survive.
pub fn from_grpc_status(status: &tonic::Status) -> Status {
    let code = Code::from_i32(status.code() as i32);
    let details = if status.details().is_empty() {
        Vec::new()
    } else {
        RpcStatus::decode(status.details())
            .map(|payload| payload.details.iter().map(detail_from_any).collect())
            .unwrap_or_default()
    };
    Status::with_details(code, status.message(), details)
}

fn detail_to_any(detail: &Detail) -> prost_types::Any {
    match detail {
        Detail::Error(err) => proto::Error {
            code: err.code,
            message: err.message.clone(),
        }
        .to_any(),
        Detail::Unrecognized { type_url, value } => prost_types::Any {
            type_url: type_url.clone(),
            value: value.clone(),
        },
    }
}

fn detail_from_any(any: &prost_types::Any) -> Detail {
    match proto::Error::from_any(any) {
        Some(err) => Detail::Error(TypedError::new(err.code, err.message)),
        None => Detail::Unrecognized {
            type_url: any.type_url.clone(),
            value: any.value.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_survives_grpc_projection() {
        let status = Status::not_found("tag missing")
            .with_detail(Detail::Unrecognized {
                type_url: "type.googleapis.com/google.rpc.DebugInfo".to_string(),
                value: vec![0x0a, 0x01, 0x78],
            })
            .with_detail(Detail::Error(TypedError::new(40401, "no such tag")));

        let grpc = to_grpc_status(&status);
        assert_eq!(grpc.code(), tonic::Code::NotFound);
        assert_eq!(grpc.message(), "tag missing");

        assert_eq!(from_grpc_status(&grpc), status);
    }

    #[test]
    fn test_plain_status_has_no_detail_bytes() {
        let grpc = to_grpc_status(&Status::invalid_argument("bad id"));
        assert!(grpc.details().is_empty());
        assert_eq!(grpc.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn test_garbage_details_are_dropped() {
        let grpc = tonic::Status::with_details(
            tonic::Code::Internal,
            "boom",
            Bytes::from_static(&[0xff, 0xff, 0xff]),
        );
        let status = from_grpc_status(&grpc);
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "boom");
        assert!(status.details().is_empty());
    }
}
