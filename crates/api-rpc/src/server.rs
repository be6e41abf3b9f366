//! Single-port server
//!
//! Binds one TCP listener and serves gRPC and HTTP/JSON on it through the
//! [`Dispatcher`].

use crate::dispatcher::Dispatcher;
use crate::endpoint::TagEndpoint;
use crate::error::ServerError;
use crate::grpc;
use crate::web::{self, AssetDirs};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tagsvc_core::application::Pipeline;
use tagsvc_core::port::TagService;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8004;
const DEFAULT_SWAGGER_DIR: &str = "proto";
const DEFAULT_SWAGGER_UI_DIR: &str = "third_party/swagger-ui";
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
/// Pause after a failed accept (e.g. EMFILE) before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Server Configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub swagger_dir: PathBuf,
    pub swagger_ui_dir: PathBuf,
    /// Upper bound on waiting for open connections after `stop`
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            swagger_dir: expand(DEFAULT_SWAGGER_DIR),
            swagger_ui_dir: expand(DEFAULT_SWAGGER_UI_DIR),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `TAGSVC_HOST`, `TAGSVC_PORT`, `TAGSVC_SWAGGER_DIR`, `TAGSVC_SWAGGER_UI_DIR`
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(host) = lookup("TAGSVC_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("TAGSVC_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ServerError::Config(format!("TAGSVC_PORT is not a port: {}", port)))?;
        }
        if let Some(dir) = lookup("TAGSVC_SWAGGER_DIR") {
            config.swagger_dir = expand(&dir);
        }
        if let Some(dir) = lookup("TAGSVC_SWAGGER_UI_DIR") {
            config.swagger_ui_dir = expand(&dir);
        }
        Ok(config)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn expand(path: &str) -> PathBuf {
    shellexpand::tilde(path).into_owned().into()
}

/// Tag Service server (gRPC + HTTP gateway on one port)
pub struct RpcServer {
    config: ServerConfig,
    endpoint: TagEndpoint,
}

impl RpcServer {
    pub fn new(config: ServerConfig, pipeline: Arc<Pipeline>, service: Arc<dyn TagService>) -> Self {
        Self {
            config,
            endpoint: TagEndpoint::new(pipeline, service),
        }
    }

    /// Bind and start accepting; returns once the listener is live
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

        let assets = AssetDirs {
            swagger_dir: self.config.swagger_dir.clone(),
            swagger_ui_dir: self.config.swagger_ui_dir.clone(),
        };
        let dispatcher = Dispatcher::new(
            grpc::routes(self.endpoint.clone())?,
            web::router(self.endpoint, &assets),
        );

        info!(
            addr = %local_addr,
            swagger_dir = %assets.swagger_dir.display(),
            "Serving gRPC and HTTP gateway on one port"
        );

        // The receiver exists before the loop is spawned, so an early stop is never missed
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(
            listener,
            dispatcher,
            shutdown_rx,
            self.config.shutdown_timeout,
        ));

        Ok(ServerHandle {
            local_addr,
            shutdown: shutdown_tx,
            task,
        })
    }
}

async fn accept_loop(
    listener: TcpListener,
    dispatcher: Dispatcher,
    mut shutdown_rx: watch::Receiver<bool>,
    shutdown_timeout: Duration,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            warn!(peer = %peer, error = %e, "Failed to set TCP_NODELAY");
                        }
                        let dispatcher = dispatcher.clone();
                        let mut conn_shutdown = shutdown_rx.clone();
                        connections.spawn(async move {
                            dispatcher.serve_connection(stream, peer, &mut conn_shutdown).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
            // Reap finished connections so the set does not grow unbounded
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            _ = shutdown_rx.changed() => {
                info!("Shutdown signal received, stopping new connections");
                break;
            }
        }
    }
    drop(listener);

    info!(
        active_connections = connections.len(),
        timeout_seconds = shutdown_timeout.as_secs(),
        "Waiting for active connections to drain"
    );
    let drained = tokio::time::timeout(shutdown_timeout, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    match drained {
        Ok(()) => info!("All connections drained, server stopped"),
        Err(_) => {
            warn!(
                active_connections = connections.len(),
                "Shutdown timeout reached, aborting remaining connections"
            );
            connections.abort_all();
        }
    }
}

/// Handle to a running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Actual bound address (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, drain open connections, wait for the accept loop to exit
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.send_replace(true);
        self.task
            .await
            .map_err(|_| ServerError::Shutdown(self.local_addr))
    }
}
