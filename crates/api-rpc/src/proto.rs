//! Wire messages for `tag_service.TagService`
//!
//! Generated from `proto/tag_service.proto` by the build script, together with
//! the gRPC server/client and the descriptor served by reflection.

use prost::Message as _;
use tagsvc_core::domain;

tonic::include_proto!("tag_service");

/// `google.rpc.Status`, the payload of `grpc-status-details-bin`
pub mod rpc {
    tonic::include_proto!("google.rpc");
}

pub use rpc::Status as RpcStatus;

/// Encoded descriptor set for the reflection service
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("tag_service_descriptor");

pub const PACKAGE: &str = "tag_service";
pub const SERVICE_NAME: &str = "tag_service.TagService";

/// `type_url` of the typed error detail
pub const ERROR_TYPE_URL: &str = "type.googleapis.com/tag_service.Error";

impl From<domain::Tag> for Tag {
    fn from(tag: domain::Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            state: tag.state.as_u32(),
        }
    }
}

impl From<&domain::TagPage> for Pager {
    fn from(page: &domain::TagPage) -> Self {
        Self {
            page: page.page.page,
            page_size: page.page.page_size,
            total_rows: page.total_rows,
        }
    }
}

impl From<domain::TagPage> for GetTagListReply {
    fn from(page: domain::TagPage) -> Self {
        let pager = Pager::from(&page);
        Self {
            list: page.tags.into_iter().map(Tag::from).collect(),
            pager: Some(pager),
        }
    }
}

impl Error {
    pub fn to_any(&self) -> prost_types::Any {
        prost_types::Any {
            type_url: ERROR_TYPE_URL.to_string(),
            value: self.encode_to_vec(),
        }
    }

    /// Decode an `Any` carrying this message; `None` for any other type
    pub fn from_any(any: &prost_types::Any) -> Option<Self> {
        if any.type_url != ERROR_TYPE_URL {
            return None;
        }
        Self::decode(any.value.as_slice()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_any_roundtrip_checks_type_url() {
        let err = Error {
            code: 40401,
            message: "no such tag".to_string(),
        };
        let any = err.to_any();
        assert_eq!(Error::from_any(&any), Some(err));

        let foreign = prost_types::Any {
            type_url: "type.googleapis.com/google.rpc.DebugInfo".to_string(),
            value: any.value.clone(),
        };
        assert_eq!(Error::from_any(&foreign), None);
    }

    #[test]
    fn test_list_request_from_partial_json() {
        let req: GetTagListRequest = serde_json::from_str(r#"{"name":"go"}"#).unwrap();
        assert_eq!(req.name, "go");
        assert_eq!(req.state, None);
        assert_eq!(req.page, 0);
    }

    #[test]
    fn test_descriptor_lists_service_methods() {
        let set = prost_types::FileDescriptorSet::decode(FILE_DESCRIPTOR_SET).unwrap();
        let file = set
            .file
            .iter()
            .find(|f| f.package.as_deref() == Some(PACKAGE))
            .unwrap();

        let service = &file.service[0];
        assert_eq!(
            format!("{}.{}", PACKAGE, service.name.as_deref().unwrap()),
            SERVICE_NAME
        );
        let methods: Vec<_> = service
            .method
            .iter()
            .filter_map(|m| m.name.as_deref())
            .collect();
        assert_eq!(methods, vec!["GetTag", "GetTagList", "CreateTag"]);
    }

    #[test]
    fn test_tag_json_shape() {
        let tag = Tag {
            id: 7,
            name: "go".to_string(),
            state: 1,
        };
        assert_eq!(
            serde_json::to_value(&tag).unwrap(),
            serde_json::json!({"id": 7, "name": "go", "state": 1})
        );
    }
}
