//! Route handlers
//!
//! ```text
//! GET  /                 - dashboard page
//! GET  /panel            - current panel fragment
//! POST /panel/refresh    - fetch now and return the new fragment
//! POST /panel/click      - theater click (lat/lon query parameters)
//! GET  /api/panel        - panel status
//! POST /api/posture      - push a snapshot
//! POST /api/theaters/:id/focus - focus the map on a rendered theater
//! GET  /api/map/focus    - last focused location
//! GET  /api/health       - health check
//! ```

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use posture_panel::{PanelState, PanelStatus};
use posture_types::CachedTheaterPosture;

use crate::error::{DashboardError, DashboardResult};
use crate::page::render_page;
use crate::state::{AppState, MapFocus};

/// Build the route table
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/panel", get(panel_fragment))
        .route("/panel/refresh", post(refresh_panel))
        .route("/panel/click", post(click_theater))
        .route("/api/panel", get(panel_status))
        .route("/api/posture", post(push_posture))
        .route("/api/theaters/:id/focus", post(focus_theater))
        .route("/api/map/focus", get(map_focus))
        .route("/api/health", get(health_check))
}

/// GET / - Dashboard page
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.html.render()))
}

/// GET /panel - Current fragment
async fn panel_fragment(State(state): State<AppState>) -> DashboardResult<Html<String>> {
    if state.posture.is_destroyed() {
        return Err(DashboardError::PanelDestroyed);
    }
    Ok(Html(state.html.render()))
}

/// POST /panel/refresh - Manual refresh
async fn refresh_panel(State(state): State<AppState>) -> DashboardResult<Html<String>> {
    match state.posture.refresh().await {
        PanelState::Destroyed => Err(DashboardError::PanelDestroyed),
        _ => Ok(Html(state.html.render())),
    }
}

/// Raw coordinates as carried by the element's data attributes
#[derive(Debug, Deserialize)]
pub struct ClickParams {
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
}

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub handled: bool,
}

/// POST /panel/click - Theater click
async fn click_theater(
    State(state): State<AppState>,
    Query(params): Query<ClickParams>,
) -> Json<ClickResponse> {
    let handled = state.posture.handle_location_click(&params.lat, &params.lon);
    Json(ClickResponse { handled })
}

/// GET /api/panel - Panel status
async fn panel_status(State(state): State<AppState>) -> Json<PanelStatus> {
    Json(state.posture.status())
}

/// POST /api/posture - Push a snapshot
async fn push_posture(
    State(state): State<AppState>,
    Json(snapshot): Json<CachedTheaterPosture>,
) -> DashboardResult<Json<PanelStatus>> {
    tracing::info!(theaters = snapshot.postures.len(), "Received pushed theater posture");

    match state.posture.update(Some(snapshot)) {
        PanelState::Destroyed => Err(DashboardError::PanelDestroyed),
        _ => Ok(Json(state.posture.status())),
    }
}

/// POST /api/theaters/:id/focus - Click a rendered theater by id
async fn focus_theater(
    State(state): State<AppState>,
    Path(theater_id): Path<String>,
) -> DashboardResult<Json<MapFocus>> {
    if !state.posture.click_theater(&theater_id) {
        return Err(DashboardError::NotFound(format!(
            "theater {} is not on the panel",
            theater_id
        )));
    }

    state
        .map_focus()
        .map(Json)
        .ok_or_else(|| DashboardError::NotFound("no theater has been selected".to_string()))
}

/// GET /api/map/focus - Last focused location
async fn map_focus(State(state): State<AppState>) -> DashboardResult<Json<MapFocus>> {
    state
        .map_focus()
        .map(Json)
        .ok_or_else(|| DashboardError::NotFound("no theater has been selected".to_string()))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub panel: PanelState,
}

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "posture-dashboard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        panel: state.posture.state(),
    })
}
