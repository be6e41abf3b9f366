//! gRPC server for `tag_service.TagService`
//!
//! The generated server owns routing and codecs; every method delegates to
//! [`TagEndpoint`] so the interceptor pipeline runs for each call.

use crate::endpoint::TagEndpoint;
use crate::proto;
use crate::proto::tag_service_server::{TagService, TagServiceServer};
use crate::status::to_grpc_status;
use tonic::{Request, Response};

#[derive(Clone)]
pub struct TagRpc {
    endpoint: TagEndpoint,
}

impl TagRpc {
    pub fn new(endpoint: TagEndpoint) -> Self {
        Self { endpoint }
    }
}

#[tonic::async_trait]
impl TagService for TagRpc {
    async fn get_tag(
        &self,
        request: Request<proto::GetTagRequest>,
    ) -> Result<Response<proto::Tag>, tonic::Status> {
        self.endpoint
            .get_tag(request.into_inner())
            .await
            .map(Response::new)
            .map_err(|s| to_grpc_status(&s))
    }

    async fn get_tag_list(
        &self,
        request: Request<proto::GetTagListRequest>,
    ) -> Result<Response<proto::GetTagListReply>, tonic::Status> {
        self.endpoint
            .get_tag_list(request.into_inner())
            .await
            .map(Response::new)
            .map_err(|s| to_grpc_status(&s))
    }

    async fn create_tag(
        &self,
        request: Request<proto::CreateTagRequest>,
    ) -> Result<Response<proto::Tag>, tonic::Status> {
        self.endpoint
            .create_tag(request.into_inner())
            .await
            .map(Response::new)
            .map_err(|s| to_grpc_status(&s))
    }
}

/// gRPC routes served on the shared port: the Tag Service plus reflection
pub fn routes(endpoint: TagEndpoint) -> Result<tonic::service::Routes, tonic_reflection::server::Error> {
    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(proto::FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Ok(tonic::service::Routes::new(TagServiceServer::new(TagRpc::new(endpoint))).add_service(reflection))
}
