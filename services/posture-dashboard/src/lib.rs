//! Posture Dashboard
//!
//! Hosts a single strategic posture panel over HTTP: serves the page and
//! the panel fragment, and exposes the refresh, theater-click and snapshot
//! push entry points.

pub mod config;
pub mod error;
pub mod page;
pub mod routes;
pub mod state;

use axum::{http::HeaderValue, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use state::{build_source, AppState, MapFocus};

/// Create the dashboard router with the configured middleware
pub fn create_router(state: AppState, config: &config::ApiSettings) -> Router {
    let mut router = routes::routes().with_state(state);

    if config.enable_tracing {
        router = router.layer(TraceLayer::new_for_http());
    }

    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    if config.enable_cors {
        let cors = if config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse::<HeaderValue>().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}
