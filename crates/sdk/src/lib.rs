//! Tag Service SDK - Rust Client Library
//!
//! Typed gRPC client for the Tag Service. Errors carry the server's Structured
//! Error, including the business code of its typed detail.
//!
//! # Example
//!
//! ```no_run
//! use tagsvc_sdk::TagServiceClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TagServiceClient::connect("http://127.0.0.1:8004").await?;
//!
//!     let tag = client.create_tag("rust", None).await?;
//!     println!("Created tag {} ({})", tag.name, tag.id);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub use client::TagServiceClient;
pub use error::{Result, SdkError};
pub use tagsvc_api_rpc::proto::{CreateTagRequest, GetTagListReply, GetTagListRequest, Pager, Tag};
