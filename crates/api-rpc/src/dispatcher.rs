//! Protocol Dispatcher
//!
//! One listener serves both wire protocols. Each request is classified on its
//! negotiated HTTP version and declared content type, then handed untouched to
//! either the gRPC routes or the HTTP router.

use axum::body::{Body, HttpBody};
use axum::Router;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Request, Response, StatusCode, Version};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tower::ServiceExt;
use tracing::{debug, error};

/// Grace period for in-flight requests on a connection being shut down
const CONNECTION_DRAIN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Grpc,
    Http,
}

/// gRPC iff HTTP/2 and a `application/grpc` (or `application/grpc+<codec>`) media type
pub fn classify<B>(req: &Request<B>) -> Protocol {
    if req.version() == Version::HTTP_2 && has_grpc_content_type(req.headers()) {
        Protocol::Grpc
    } else {
        Protocol::Http
    }
}

fn has_grpc_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let media = value.split(';').next().unwrap_or_default().trim();
            media == "application/grpc" || media.starts_with("application/grpc+")
        })
        .unwrap_or(false)
}

/// Immutable routing pair shared by every connection
#[derive(Clone)]
pub struct Dispatcher {
    grpc: tonic::service::Routes,
    http: Router,
}

impl Dispatcher {
    pub fn new(grpc: tonic::service::Routes, http: Router) -> Self {
        Self { grpc, http }
    }

    /// Route one request; never fails, transport faults become a bare 500
    pub async fn dispatch<B>(self, req: Request<B>) -> Result<Response<Body>, Infallible>
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        match classify(&req) {
            Protocol::Grpc => match self.grpc.oneshot(req.map(tonic::body::boxed)).await {
                Ok(response) => Ok(response.map(Body::new)),
                Err(e) => {
                    error!(error = %e, "gRPC routing failed");
                    let mut response = Response::new(Body::empty());
                    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                    Ok(response)
                }
            },
            Protocol::Http => self.http.oneshot(req).await,
        }
    }

    /// Serve one accepted connection until it closes or shutdown is signalled
    pub async fn serve_connection(
        self,
        stream: TcpStream,
        peer: SocketAddr,
        shutdown: &mut watch::Receiver<bool>,
    ) {
        let io = TokioIo::new(stream);
        let service = hyper::service::service_fn(move |req: Request<Incoming>| {
            self.clone().dispatch(req)
        });

        let builder = auto::Builder::new(TokioExecutor::new());
        let conn = builder.serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = &mut conn => {
                if let Err(e) = result {
                    debug!(peer = %peer, error = %e, "Connection closed with error");
                }
            }
            _ = shutdown.changed() => {
                debug!(peer = %peer, "Gracefully closing connection");
                conn.as_mut().graceful_shutdown();
                if tokio::time::timeout(CONNECTION_DRAIN, conn).await.is_err() {
                    debug!(peer = %peer, "Connection drain timed out");
                }
            }
        }
    }
}
