//! Dashboard Route Tests
//!
//! Drives the router with `oneshot` against an in-memory snapshot source.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use posture_dashboard::{config::ApiSettings, config::PanelSettings, create_router, AppState};
use posture_panel::{CachedTheaterPosture, PostureError, StaticSource};

fn snapshot_json() -> Value {
    json!({
        "postures": [
            {
                "theaterId": "baltic",
                "theaterName": "Baltic Theater",
                "shortName": "BALTIC",
                "centerLat": 56.0,
                "centerLon": 20.0,
                "fighters": 3,
                "totalAircraft": 3,
                "postureLevel": "normal",
                "trend": "stable",
                "changePercent": 0,
                "strikeCapable": false
            },
            {
                "theaterId": "iran",
                "theaterName": "Iran Theater",
                "shortName": "IRAN",
                "centerLat": 32.5,
                "centerLon": 53.0,
                "fighters": 10,
                "tankers": 4,
                "totalAircraft": 14,
                "postureLevel": "critical",
                "trend": "increasing",
                "changePercent": 40,
                "strikeCapable": true,
                "targetNation": "Iran"
            }
        ],
        "totalFlights": 17,
        "timestamp": "2026-10-16T09:15:00Z",
        "cached": true
    })
}

fn snapshot() -> CachedTheaterPosture {
    serde_json::from_value(snapshot_json()).unwrap()
}

fn setup(source: StaticSource) -> (AppState, Arc<StaticSource>, Router) {
    let source = Arc::new(source);
    let state = AppState::new(source.clone(), &PanelSettings::default(), false);
    let router = create_router(state.clone(), &ApiSettings::default());
    (state, source, router)
}

async fn request(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    let body = match body {
        Some(json_body) => Body::from(serde_json::to_vec(&json_body).unwrap()),
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let (_, _, router) = setup(StaticSource::empty());
    let (status, body) = request(&router, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["panel"], "loading");
}

#[tokio::test]
async fn test_refresh_renders_fragment() {
    let (_, source, router) = setup(StaticSource::new(Some(snapshot())));

    let (status, body) = request(&router, "POST", "/panel/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.calls(), 1);
    assert!(body.contains("Iran Theater"));
    assert!(body.contains("STRIKE CAPABLE"));
    assert!(body.contains("Updated 09:15 UTC"));
    assert!(body.contains("panel-badge-urgent"));
    assert!(body.find("Iran Theater").unwrap() < body.find("BALTIC").unwrap());

    let (_, page) = request(&router, "GET", "/", None).await;
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("Iran Theater"));
}

#[tokio::test]
async fn test_refresh_error_shows_placeholder() {
    let (state, source, router) = setup(StaticSource::new(Some(snapshot())));
    request(&router, "POST", "/panel/refresh", None).await;

    source.fail_with(PostureError::Upstream { status: 503 });
    let (status, body) = request(&router, "POST", "/panel/refresh", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error Loading"));
    assert_eq!(state.posture.summaries().len(), 2);

    let (_, status_body) = request(&router, "GET", "/api/panel", None).await;
    let json: Value = serde_json::from_str(&status_body).unwrap();
    assert_eq!(json["state"], "error");
    assert_eq!(json["theater_count"], 2);
    assert_eq!(json["last_error_code"], "UPSTREAM_ERROR");
    assert_eq!(json["refresh_interval_secs"], 300);
}

#[tokio::test]
async fn test_push_snapshot() {
    let (_, source, router) = setup(StaticSource::empty());

    let (status, body) = request(&router, "POST", "/api/posture", Some(snapshot_json())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.calls(), 0);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "rendered");
    assert_eq!(json["critical_count"], 1);
    assert_eq!(json["badge"]["urgent"], true);

    let (_, fragment) = request(&router, "GET", "/panel", None).await;
    assert!(fragment.contains("↑ +40%"));

    let (_, body) = request(&router, "POST", "/api/posture", Some(json!({ "postures": [] }))).await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "no_data");
}

#[tokio::test]
async fn test_theater_click_sets_focus() {
    let (_, _, router) = setup(StaticSource::empty());

    let (status, _) = request(&router, "GET", "/api/map/focus", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = request(&router, "POST", "/panel/click?lat=32.5&lon=53", None).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["handled"], true);

    let (status, body) = request(&router, "GET", "/api/map/focus", None).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["lat"], 32.5);
    assert_eq!(json["lon"], 53.0);

    let (_, body) = request(&router, "POST", "/panel/click?lat=NaN&lon=53", None).await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["handled"], false);
}

#[tokio::test]
async fn test_focus_theater_by_id() {
    let (_, _, router) = setup(StaticSource::empty());

    let (status, _) = request(&router, "POST", "/api/theaters/iran/focus", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    request(&router, "POST", "/api/posture", Some(snapshot_json())).await;
    let (status, body) = request(&router, "POST", "/api/theaters/iran/focus", None).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["lat"], 32.5);
    assert_eq!(json["lon"], 53.0);

    let (status, _) = request(&router, "POST", "/api/theaters/arctic/focus", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_destroyed_panel_rejects_refresh() {
    let (state, source, router) = setup(StaticSource::new(Some(snapshot())));
    state.posture.destroy();

    let (status, _) = request(&router, "POST", "/panel/refresh", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(source.calls(), 0);

    let (status, _) = request(&router, "GET", "/panel", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_bundled_fixture_renders() {
    use posture_dashboard::{build_source, config::SourceSettings};

    let mut settings = SourceSettings::default();
    settings.fixture_path = Some(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/theater-posture.json"),
    );

    let state = AppState::new(build_source(&settings), &PanelSettings::default(), false);
    let router = create_router(state.clone(), &ApiSettings::default());

    let (status, body) = request(&router, "POST", "/panel/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Taiwan Strait"));
    assert!(body.contains("↓ -18%"));
    assert_eq!(state.posture.summaries().len(), 3);
}
