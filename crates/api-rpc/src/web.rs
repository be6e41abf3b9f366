//! Plain HTTP surface: liveness, API schema documents, documentation assets
//!
//! None of these routes pass through the interceptor pipeline.

use crate::endpoint::TagEndpoint;
use crate::gateway;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;
use tagsvc_core::application::JSON_CONTENT_TYPE;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Directories backing the documentation routes
#[derive(Debug, Clone)]
pub struct AssetDirs {
    /// Holds `*.swagger.json` schema documents
    pub swagger_dir: PathBuf,
    /// Static swagger-ui bundle
    pub swagger_ui_dir: PathBuf,
}

async fn ping() -> &'static str {
    "pong"
}

async fn swagger_doc(State(dir): State<Arc<PathBuf>>, Path(path): Path<String>) -> Response {
    if !path.ends_with("swagger.json") || !is_contained(&path) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let file = dir.join(&path);
    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], bytes).into_response(),
        Err(e) => {
            debug!(path = %file.display(), error = %e, "Schema document not served");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Only plain relative components; rooted, prefixed or `..` paths would escape the directory
fn is_contained(path: &str) -> bool {
    FsPath::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// Everything served over plain HTTP on the shared port
pub fn router(endpoint: TagEndpoint, assets: &AssetDirs) -> Router {
    let docs = Router::new()
        .route("/swagger/*path", get(swagger_doc))
        .with_state(Arc::new(assets.swagger_dir.clone()));

    Router::new()
        .route("/ping", get(ping))
        .merge(docs)
        .nest_service("/swagger-ui", ServeDir::new(&assets.swagger_ui_dir))
        .merge(gateway::router(endpoint))
        .layer(TraceLayer::new_for_http())
}
