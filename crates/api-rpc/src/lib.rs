//! Tag Service API Layer
//!
//! gRPC and an HTTP/JSON gateway served together on one port. Both surfaces
//! call the Tag Service through the same interceptor pipeline.

pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod grpc;
pub mod web;
pub mod proto;
pub mod server;
pub mod status;

pub use dispatcher::{classify, Dispatcher, Protocol};
pub use endpoint::TagEndpoint;
pub use error::ServerError;
pub use server::{RpcServer, ServerConfig, ServerHandle};
pub use status::{from_grpc_status, to_grpc_status};
