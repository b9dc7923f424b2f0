//! Posture Dashboard Server
//!
//! Serves the strategic posture panel and keeps it refreshed from the
//! theater posture aggregation service.
//!
//! # Usage
//!
//! ```bash
//! # Poll an aggregation service
//! posture-dashboard --upstream-url http://localhost:3000/api/theater-posture
//!
//! # Serve a local snapshot
//! posture-dashboard --fixture fixtures/theater-posture.json
//!
//! # Start with environment overrides
//! POSTURE__SERVER__PORT=8080 posture-dashboard
//! ```

use std::future::{Future, IntoFuture};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::Notify;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use posture_dashboard::{build_source, config, create_router, AppState, DashboardConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Posture Dashboard - strategic posture panel server
#[derive(Parser, Debug)]
#[command(name = "posture-dashboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "POSTURE_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "POSTURE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "POSTURE_PORT")]
    port: Option<u16>,

    /// Aggregation service endpoint for the cached theater posture
    #[arg(long, env = "POSTURE_UPSTREAM_URL")]
    upstream_url: Option<String>,

    /// Serve snapshots from a local JSON file instead
    #[arg(long, env = "POSTURE_FIXTURE")]
    fixture: Option<PathBuf>,

    /// Refresh period in seconds
    #[arg(long, env = "POSTURE_REFRESH_INTERVAL_SECS")]
    refresh_interval_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "POSTURE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "POSTURE_LOG_FORMAT")]
    log_format: Option<String>,
}

impl Args {
    /// Apply CLI overrides on top of the loaded configuration
    fn apply(self, config: &mut DashboardConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.upstream_url {
            config.source.upstream_url = Some(url);
        }
        if let Some(path) = self.fixture {
            config.source.fixture_path = Some(path);
        }
        if let Some(secs) = self.refresh_interval_secs {
            config.panel.refresh_interval_secs = secs;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut dashboard_config = DashboardConfig::load(args.config.as_deref())?;
    args.apply(&mut dashboard_config);

    init_logging(&dashboard_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Posture Dashboard"
    );

    validate_config(&dashboard_config)?;

    let source = build_source(&dashboard_config.source);
    let state = AppState::new(source, &dashboard_config.panel, true);
    let posture = state.posture.clone();

    let app = create_router(state, &dashboard_config.api);

    let addr = dashboard_config.server.socket_addr().await?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        host = %dashboard_config.server.host,
        addr = %addr,
        "Server listening"
    );

    let draining = Arc::new(Notify::new());
    let server = {
        let posture = posture.clone();
        let draining = draining.clone();
        axum::serve(listener, app).with_graceful_shutdown(async move {
            shutdown_signal().await;
            posture.destroy();
            draining.notify_one();
        })
    };

    serve_with_drain_cap(
        server.into_future(),
        &draining,
        dashboard_config.server.shutdown_timeout(),
    )
    .await?;

    posture.destroy();
    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init()?,
    }

    Ok(())
}

/// Validate configuration
fn validate_config(config: &DashboardConfig) -> anyhow::Result<()> {
    if config.panel.refresh_interval_secs == 0 {
        anyhow::bail!("panel.refresh_interval_secs must be greater than zero");
    }

    if let Some(url) = &config.source.upstream_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("source.upstream_url must be an http(s) URL, got {}", url);
        }
    }

    if config.source.upstream_url.is_some() && config.source.fixture_path.is_some() {
        tracing::warn!("Both upstream_url and fixture_path are set, the fixture wins");
    }

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

}

/// Run the server until it has drained, giving up `cap` after `draining`
/// is notified
async fn serve_with_drain_cap<F>(server: F, draining: &Notify, cap: Duration) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let deadline = async {
        draining.notified().await;
        tracing::info!(
            timeout_secs = cap.as_secs(),
            "Waiting for in-flight requests to complete..."
        );
        tokio::time::sleep(cap).await;
    };

    tokio::select! {
        result = server => result,
        _ = deadline => {
            tracing::warn!(
                timeout_secs = cap.as_secs(),
                "In-flight requests still open at shutdown timeout, exiting"
            );
            Ok(())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from([
            "posture-dashboard",
            "--port",
            "8080",
            "--upstream-url",
            "http://localhost:3000/api/theater-posture",
        ]);
        assert_eq!(args.port, Some(8080));

        let mut config = DashboardConfig::default();
        args.apply(&mut config);
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.source.upstream_url.as_deref(),
            Some("http://localhost:3000/api/theater-posture")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_timeout() {
        let draining = Notify::new();
        draining.notify_one();

        let started = tokio::time::Instant::now();
        let result = serve_with_drain_cap(
            std::future::pending(),
            &draining,
            Duration::from_secs(5),
        )
        .await;

        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drained_server_exits_without_waiting() {
        let draining = Notify::new();
        draining.notify_one();

        let started = tokio::time::Instant::now();
        serve_with_drain_cap(async { Ok(()) }, &draining, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_deadline_before_shutdown() {
        let draining = Notify::new();

        let result = tokio::time::timeout(
            Duration::from_secs(60),
            serve_with_drain_cap(
                std::future::pending(),
                &draining,
                Duration::from_secs(5),
            ),
        )
        .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = DashboardConfig::development();
        config.panel.refresh_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_upstream() {
        let mut config = DashboardConfig::development();
        config.source.upstream_url = Some("ftp://posture".to_string());
        assert!(validate_config(&config).is_err());

        config.source.upstream_url = Some("https://posture.internal/api/theater-posture".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
