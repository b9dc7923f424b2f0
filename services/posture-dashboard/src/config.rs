//! Dashboard Configuration
//!
//! Configuration management for the posture dashboard.
//! Supports environment variables, config files, and CLI arguments.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Where posture snapshots come from
    #[serde(default)]
    pub source: SourceSettings,

    /// Panel configuration
    #[serde(default)]
    pub panel: PanelSettings,

    /// HTTP layer configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Grace period for in-flight requests on shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    /// Resolve the socket address to bind to; `host` may be an IP literal
    /// or a hostname such as `localhost`
    pub async fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| anyhow::anyhow!("host {} did not resolve to an address", self.host))
    }

    /// Get the shutdown timeout duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Snapshot source settings. A fixture file takes precedence over the
/// upstream URL; with neither, the panel only shows pushed snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Aggregation service endpoint returning the cached theater posture
    #[serde(default)]
    pub upstream_url: Option<String>,

    /// Local JSON snapshot to serve instead of the upstream service
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            upstream_url: None,
            fixture_path: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SourceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Panel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSettings {
    /// DOM id of the panel
    #[serde(default = "default_panel_id")]
    pub id: String,

    /// Header title
    #[serde(default = "default_panel_title")]
    pub title: String,

    /// Refresh period in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            id: default_panel_id(),
            title: default_panel_title(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl PanelSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// HTTP layer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable response compression
    #[serde(default = "default_true")]
    pub enable_compression: bool,

    /// Enable request tracing
    #[serde(default = "default_true")]
    pub enable_tracing: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_compression: true,
            enable_tracing: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3090
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    20
}

fn default_panel_id() -> String {
    "strategic-posture".to_string()
}

fn default_panel_title() -> String {
    "AI Strategic Posture".to_string()
}

fn default_refresh_interval() -> u64 {
    300 // 5 minutes
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

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl DashboardConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        // Environment variables with POSTURE_ prefix, e.g. POSTURE__SERVER__PORT
        builder = builder.add_source(
            config::Environment::with_prefix("POSTURE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let dashboard_config: DashboardConfig = config.try_deserialize()?;

        Ok(dashboard_config)
    }

    /// Create a configuration for local development
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            ..Default::default()
        }
    }
}
