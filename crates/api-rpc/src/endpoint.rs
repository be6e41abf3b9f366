//! RPC Endpoint
//!
//! Binds the interceptor pipeline to the Tag Service. Both the gRPC server and
//! the HTTP gateway call through here, so every call, whatever its wire
//! protocol, runs the same interceptor chain.

use crate::proto;
use std::sync::Arc;
use tagsvc_core::application::Pipeline;
use tagsvc_core::domain::{errcode, NewTag, PageRequest, Status, TagFilter, TagState};
use tagsvc_core::port::TagService;

pub const GET_TAG: &str = "/tag_service.TagService/GetTag";
pub const GET_TAG_LIST: &str = "/tag_service.TagService/GetTagList";
pub const CREATE_TAG: &str = "/tag_service.TagService/CreateTag";

#[derive(Clone)]
pub struct TagEndpoint {
    pipeline: Arc<Pipeline>,
    service: Arc<dyn TagService>,
}

impl TagEndpoint {
    pub fn new(pipeline: Arc<Pipeline>, service: Arc<dyn TagService>) -> Self {
        Self { pipeline, service }
    }

    pub async fn get_tag(&self, request: proto::GetTagRequest) -> Result<proto::Tag, Status> {
        let service = Arc::clone(&self.service);
        self.pipeline
            .call(GET_TAG, request, move |req: proto::GetTagRequest| async move {
                let tag = service.get_tag(req.id).await?;
                Ok::<_, Status>(proto::Tag::from(tag))
            })
            .await
    }

    pub async fn get_tag_list(
        &self,
        request: proto::GetTagListRequest,
    ) -> Result<proto::GetTagListReply, Status> {
        let service = Arc::clone(&self.service);
        self.pipeline
            .call(GET_TAG_LIST, request, move |req: proto::GetTagListRequest| async move {
                let filter = TagFilter {
                    name: Some(req.name).filter(|n| !n.is_empty()),
                    state: req.state.map(parse_state).transpose()?,
                };
                let page = PageRequest::new(req.page, req.page_size);
                let page = service.list_tags(filter, page).await?;
                Ok::<_, Status>(proto::GetTagListReply::from(page))
            })
            .await
    }

    pub async fn create_tag(&self, request: proto::CreateTagRequest) -> Result<proto::Tag, Status> {
        let service = Arc::clone(&self.service);
        self.pipeline
            .call(CREATE_TAG, request, move |req: proto::CreateTagRequest| async move {
                let state = parse_state(req.state.unwrap_or(TagState::Enabled.as_u32()))?;
                let new_tag = NewTag::new(req.name, state)
                    .map_err(|e| errcode::INVALID_PARAMS.with_message(e.to_string()))?;
                let tag = service.create_tag(new_tag).await?;
                Ok::<_, Status>(proto::Tag::from(tag))
            })
            .await
    }
}

fn parse_state(value: u32) -> Result<TagState, Status> {
    TagState::from_u32(value).map_err(|e| errcode::INVALID_PARAMS.with_message(e.to_string()))
}
