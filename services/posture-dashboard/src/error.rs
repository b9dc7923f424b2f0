//! Dashboard error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Dashboard result type
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors surfaced by dashboard endpoints
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Posture panel has been shut down")]
    PanelDestroyed,
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl DashboardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PanelDestroyed => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::PanelDestroyed => "PANEL_DESTROYED",
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Dashboard request failed");
        }

        let body = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
