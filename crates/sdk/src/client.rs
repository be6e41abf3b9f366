//! Tag Service gRPC Client

use crate::error::{Result, SdkError};
use std::time::Duration;
use tagsvc_api_rpc::proto::tag_service_client;
use tagsvc_api_rpc::proto::{
    CreateTagRequest, GetTagListReply, GetTagListRequest, GetTagRequest, Tag,
};
use tonic::transport::{Channel, Endpoint};

/// Tag Service Client
///
/// Cheap to clone; clones share one HTTP/2 connection.
///
/// # Example
///
/// ```no_run
/// use tagsvc_sdk::TagServiceClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TagServiceClient::connect("http://127.0.0.1:8004").await?;
/// let tag = client.get_tag(7).await?;
/// println!("{} ({})", tag.name, tag.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TagServiceClient {
    inner: tag_service_client::TagServiceClient<Channel>,
}

impl TagServiceClient {
    /// Connect to the Tag Service
    ///
    /// # Arguments
    ///
    /// * `url` - Server URL (e.g., `http://127.0.0.1:8004`)
    pub async fn connect(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let endpoint = Endpoint::from_shared(url.clone())
            .map_err(|e| SdkError::InvalidUrl(format!("{}: {}", url, e)))?
            .timeout(Duration::from_secs(30));

        let channel = endpoint.connect().await?;
        Ok(Self::new(channel))
    }

    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tag_service_client::TagServiceClient::new(channel),
        }
    }

    /// GetTag
    pub async fn get_tag(&self, id: i64) -> Result<Tag> {
        let response = self.inner.clone().get_tag(GetTagRequest { id }).await?;
        Ok(response.into_inner())
    }

    /// GetTagList
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use tagsvc_sdk::{TagServiceClient, GetTagListRequest};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = TagServiceClient::connect("http://127.0.0.1:8004").await?;
    /// let reply = client.list_tags(GetTagListRequest {
    ///     state: Some(1),
    ///     page: 1,
    ///     page_size: 20,
    ///     ..Default::default()
    /// }).await?;
    /// println!("{} enabled tags", reply.list.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_tags(&self, request: GetTagListRequest) -> Result<GetTagListReply> {
        let response = self.inner.clone().get_tag_list(request).await?;
        Ok(response.into_inner())
    }

    /// CreateTag (`state` defaults to enabled on the server)
    pub async fn create_tag(&self, name: impl Into<String>, state: Option<u32>) -> Result<Tag> {
        let request = CreateTagRequest {
            name: name.into(),
            state,
        };
        let response = self.inner.clone().create_tag(request).await?;
        Ok(response.into_inner())
    }
}
