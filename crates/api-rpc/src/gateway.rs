//! HTTP/JSON Gateway
//!
//! Routing table from REST paths to Tag Service RPCs. Calls go to the
//! [`TagEndpoint`] in-process; every failure is rendered as the HTTP Error
//! Envelope through the error translator.

use crate::endpoint::TagEndpoint;
use crate::proto;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tagsvc_core::application::to_http_envelope;
use tagsvc_core::domain::{errcode, Code, Status};
use tracing::debug;

/// A Structured Error on its way out of the gateway
#[derive(Debug)]
pub struct GatewayError(pub Status);

impl From<Status> for GatewayError {
    fn from(status: Status) -> Self {
        Self(status)
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        debug!(error = %rejection, "Rejected path parameters");
        Self(Status::invalid_argument(rejection.body_text()))
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(error = %rejection, "Rejected query string");
        Self(Status::invalid_argument(rejection.body_text()))
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "Rejected JSON body");
        Self(Status::invalid_argument(rejection.body_text()))
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let envelope = to_http_envelope(&self.0);
        let status =
            StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, envelope.content_type())],
            envelope.to_json(),
        )
            .into_response()
    }
}

type GatewayResult<T> = Result<Json<T>, GatewayError>;

async fn get_tag(
    State(endpoint): State<TagEndpoint>,
    id: Result<Path<i64>, PathRejection>,
) -> GatewayResult<proto::Tag> {
    let Path(id) = id?;
    let tag = endpoint.get_tag(proto::GetTagRequest { id }).await?;
    Ok(Json(tag))
}

async fn get_tag_list(
    State(endpoint): State<TagEndpoint>,
    query: Result<Query<proto::GetTagListRequest>, QueryRejection>,
) -> GatewayResult<proto::GetTagListReply> {
    let Query(request) = query?;
    let reply = endpoint.get_tag_list(request).await?;
    Ok(Json(reply))
}

async fn create_tag(
    State(endpoint): State<TagEndpoint>,
    body: Result<Json<proto::CreateTagRequest>, JsonRejection>,
) -> GatewayResult<proto::Tag> {
    let Json(request) = body?;
    let tag = endpoint.create_tag(request).await?;
    Ok(Json(tag))
}

async fn not_found() -> GatewayError {
    GatewayError(Status::new(Code::NotFound, "Not Found"))
}

async fn method_not_allowed() -> GatewayError {
    GatewayError(errcode::METHOD_NOT_ALLOWED.to_status())
}

/// Gateway routes; unmatched paths answer with a `NOT_FOUND` envelope
pub fn router(endpoint: TagEndpoint) -> Router {
    Router::new()
        .route(
            "/api/v1/tags",
            get(get_tag_list).post(create_tag).fallback(method_not_allowed),
        )
        .route(
            "/api/v1/tags/:id",
            get(get_tag).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .with_state(endpoint)
}
