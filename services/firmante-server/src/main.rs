//! Firmante API Server
//!
//! REST API server for the Firmante multi-tenant document-signing backend.
//!
//! # Features
//!
//! - Dual-secret JWT authentication (access/refresh)
//! - Tamper-evident audit chain (C1)
//! - Document upload, signer invitation, OTP-gated signing commit (C7-C9)
//! - Email/WhatsApp notification adapter (C11)
//! - Prometheus metrics export
//! - Graceful shutdown handling
//!
//! # Usage
//!
//! ```bash
//! firmante-server
//! firmante-server --config /path/to/config.toml
//! PORT=8080 firmante-server
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use firmante_api::notify::{Notifier, ProcessWideCredentials};
use firmante_api::pdf::PassthroughStamper;
use firmante_api::{create_router, AppState};
use firmante_auth::{config::AuthConfig, JwtService};
use firmante_db::{Database, DatabaseConfig as DbConfig};

use crate::config::ServerConfig;

/// Firmante API Server - multi-tenant document-signing backend
#[derive(Parser, Debug)]
#[command(name = "firmante-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "FIRMANTE_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Redis connection URL
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Enable development mode (relaxed secret-strength checks)
    #[arg(long, env = "FIRMANTE_DEV_MODE")]
    dev_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.database.postgres_url = db_url;
    }
    if let Some(redis_url) = args.redis_url {
        server_config.database.redis_url = redis_url;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Firmante API Server");

    let db = init_database(&server_config.database).await?;
    let jwt = init_auth(args.dev_mode)?;

    let state = AppState {
        db: Arc::new(db),
        jwt: Arc::new(jwt),
        storage_root: Arc::new(PathBuf::from(&server_config.storage.root)),
        front_url: Arc::new(server_config.api.front_url.clone()),
        notifier: Arc::new(Notifier::new(ProcessWideCredentials {
            resend_api_key: server_config.notifications.resend_api_key.clone(),
            zapi_instance_id: server_config.notifications.zapi_instance_id.clone(),
            zapi_token: server_config.notifications.zapi_token.clone(),
            zapi_client_token: server_config.notifications.zapi_client_token.clone(),
        })),
        pdf_stamper: Arc::new(PassthroughStamper),
    };

    let app = create_router(state);

    if let Ok(port) = std::env::var("METRICS_PORT") {
        if let Ok(port) = port.parse() {
            start_metrics_server(port).await?;
        }
    }

    let addr = server_config.server.socket_addr();
    tracing::info!(host = %server_config.server.host, port = %server_config.server.port, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().pretty().with_target(true)).init();
        }
    }

    Ok(())
}

async fn init_database(config: &config::DatabaseSettings) -> anyhow::Result<Database> {
    tracing::info!("Connecting to database...");

    let db_config = DbConfig {
        postgres_url: config.postgres_url.clone(),
        redis_url: config.redis_url.clone(),
        pg_max_connections: config.max_connections,
        pg_min_connections: config.min_connections,
        pg_acquire_timeout_secs: config.acquire_timeout_secs,
    };

    let db = Database::connect(&db_config).await?;

    tracing::info!("Database connected successfully");

    let health = db.health_check().await?;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(postgres = health.postgres, redis = health.redis, "Database health check passed");

    Ok(db)
}

/// Build the JWT service from the dual-secret `AuthConfig` (spec §4.3).
/// `dev_mode` only relaxes the caller's own expectations — `from_env`'s
/// length/distinctness checks still apply either way.
fn init_auth(dev_mode: bool) -> anyhow::Result<JwtService> {
    tracing::info!("Initializing authentication service...");

    let auth_config = AuthConfig::from_env().map_err(|e| {
        if dev_mode {
            tracing::warn!(error = %e, "JWT config issue ignored under dev mode");
        }
        anyhow::anyhow!(e)
    })?;

    tracing::info!("Authentication service initialized");

    Ok(JwtService::new(auth_config.jwt))
}

/// Start Prometheus metrics server
async fn start_metrics_server(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(port = port, "Starting metrics server");

    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.with_http_listener(addr).install_recorder()?;

    tracing::info!("Metrics server started on port {}", port);

    tokio::spawn(async move {
        let _handle = handle;
        std::future::pending::<()>().await;
    });

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(timeout_secs = timeout.as_secs(), "Waiting for in-flight requests to complete...");

    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["firmante-server", "--port", "8080"]);
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_development_config() {
        let config = ServerConfig::development();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "debug");
    }
}
