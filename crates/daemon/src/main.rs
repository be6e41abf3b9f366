//! Tag Service - Main Entry Point
//! gRPC + HTTP/JSON gateway on one port, SQLite-backed

mod telemetry;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Import workspace crates
use tagsvc_api_rpc::{RpcServer, ServerConfig};
use tagsvc_core::application::{Pipeline, TagCatalog};
use tagsvc_core::port::time_provider::SystemTimeProvider;
use tagsvc_infra_sqlite::{create_pool, run_migrations, SqliteTagRepository};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.tagsvc/tags.db";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (TAGSVC_LOG_FORMAT=json|pretty)
    let (otel_layer, otel_error) = match telemetry::init_telemetry() {
        Ok(layer) => (layer, None),
        Err(e) => (None, Some(e)),
    };

    let log_format = std::env::var("TAGSVC_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("tagsvc=info"))
        .context("Failed to create env filter")?;
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());

    let fmt_layer = match log_format.as_str() {
        // Production: JSON structured logging
        "json" => fmt::layer().json().with_writer(writer).boxed(),
        // Development: Pretty formatting with colors
        _ => fmt::layer().pretty().with_writer(writer).boxed(),
    };

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(env_filter)
        .with(fmt_layer)
        .init();

    info!("Tag Service v{} starting...", VERSION);
    if let Some(e) = otel_error {
        warn!(error = %e, "OpenTelemetry disabled (continuing without it)");
    }

    // 2. Load configuration
    let db_path = std::env::var("TAGSVC_DB_PATH")
        .map(|p| shellexpand::tilde(&p).into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let database_url = database_url(&db_path)?;
    let pool = create_pool(&database_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let repo = Arc::new(SqliteTagRepository::new(pool.clone()));
    let catalog = Arc::new(TagCatalog::new(repo, time_provider.clone()));
    let pipeline = Arc::new(Pipeline::standard(time_provider));
    info!(interceptors = ?pipeline.names(), "Interceptor pipeline ready");

    // 5. Start server
    let handle = RpcServer::new(config, pipeline, catalog)
        .start()
        .await
        .context("Server start failed")?;

    info!(addr = %handle.local_addr(), "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    handle.stop().await.context("Server stop failed")?;
    pool.close().await;
    telemetry::shutdown_telemetry();

    info!("Shutdown complete.");
    Ok(())
}

/// `:memory:` selects a throwaway database; anything else is a file path
fn database_url(db_path: &str) -> Result<String> {
    if db_path == ":memory:" {
        return Ok("sqlite::memory:".to_string());
    }

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(format!("sqlite://{}", db_path))
}
