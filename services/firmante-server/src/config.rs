//! Server configuration
//!
//! Environment-driven, per spec §6 "Configuration (env)". Supports an
//! optional config-file overlay, but env vars are the source of truth
//! in deployment.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    pub database: DatabaseSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), shutdown_timeout_secs: default_shutdown_timeout() }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().expect("invalid socket address")
    }

    pub fn shutdown_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub postgres_url: String,
    pub redis_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

/// `uploads/` and `certificates/` base directory (spec §6 filesystem layout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_root")]
    pub root: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { root: default_storage_root() }
    }
}

/// Process-wide Resend/Z-API credentials, used as the fallback tier of
/// the §4.11 per-tenant credential resolution chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub resend_api_key: Option<String>,
    pub resend_from_email: Option<String>,
    pub zapi_instance_id: Option<String>,
    pub zapi_token: Option<String>,
    pub zapi_client_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_front_url")]
    pub front_url: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self { front_url: default_front_url(), api_base_url: default_api_base_url(), cors_origins: default_cors_origins() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_shutdown_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_acquire_timeout() -> u64 {
    30
}
fn default_storage_root() -> String {
    ".".to_string()
}
fn default_front_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl ServerConfig {
    /// Build entirely from environment variables (spec §6 "Configuration
    /// (env)"); an optional file overlay is applied first so local dev can
    /// keep secrets out of the shell.
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(config::File::with_name("config/default").required(false));

        let port = std::env::var("PORT").ok().and_then(|s| s.parse().ok());
        let database_url = std::env::var("DATABASE_URL").ok();
        let redis_url = std::env::var("REDIS_URL").ok();
        let front_url = std::env::var("FRONT_URL").ok();
        let api_base_url = std::env::var("API_BASE_URL").ok();
        let storage_root = std::env::var("STORAGE_ROOT").ok();

        let built = builder.build()?;
        let mut config: ServerConfig = built.try_deserialize().unwrap_or_else(|_| ServerConfig::development());

        if let Some(port) = port {
            config.server.port = port;
        }
        if let Some(url) = database_url {
            config.database.postgres_url = url;
        }
        if let Some(url) = redis_url {
            config.database.redis_url = url;
        }
        if let Some(url) = front_url {
            config.api.front_url = url;
        }
        if let Some(url) = api_base_url {
            config.api.api_base_url = url;
        }
        if let Some(root) = storage_root {
            config.storage.root = root;
        }

        config.notifications.resend_api_key = std::env::var("RESEND_API_KEY").ok();
        config.notifications.resend_from_email = std::env::var("RESEND_FROM_EMAIL").ok();
        config.notifications.zapi_instance_id = std::env::var("ZAPI_INSTANCE_ID").ok();
        config.notifications.zapi_token = std::env::var("ZAPI_TOKEN").ok();
        config.notifications.zapi_client_token = std::env::var("ZAPI_CLIENT_TOKEN").ok();

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    pub fn development() -> Self {
        Self {
            server: ServerSettings::default(),
            database: DatabaseSettings {
                postgres_url: "postgresql://localhost/firmante".to_string(),
                redis_url: "redis://localhost:6379".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                acquire_timeout_secs: default_acquire_timeout(),
            },
            storage: StorageSettings::default(),
            notifications: NotificationSettings::default(),
            api: ApiSettings::default(),
            logging: LoggingConfig { level: "debug".to_string(), format: "pretty".to_string() },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_config_has_sane_defaults() {
        let config = ServerConfig::development();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_socket_addr_parses() {
        let settings = ServerSettings::default();
        let addr = settings.socket_addr();
        assert_eq!(addr.port(), 8080);
    }
}
