//! Snapshot sources
//!
//! The aggregation itself happens elsewhere; a source only hands back the
//! latest cached snapshot, or `None` when the service has nothing yet.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use posture_types::{CachedTheaterPosture, PostureError, PostureResult};

/// Default timeout for a single upstream request
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Provider of cached theater posture snapshots
#[async_trait]
pub trait PostureSource: Send + Sync {
    /// Fetch the latest cached snapshot
    async fn fetch_cached_theater_posture(&self) -> PostureResult<Option<CachedTheaterPosture>>;

    /// Source name for logs
    fn name(&self) -> &str;
}

/// Source backed by the aggregation service's HTTP endpoint
pub struct HttpPostureSource {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpPostureSource {
    /// Create a source for a snapshot URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PostureSource for HttpPostureSource {
    async fn fetch_cached_theater_posture(&self) -> PostureResult<Option<CachedTheaterPosture>> {
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PostureError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PostureError::Upstream {
                status: status.as_u16(),
            });
        }

        let snapshot = resp
            .json::<CachedTheaterPosture>()
            .await
            .map_err(|e| PostureError::Decode(e.to_string()))?;

        tracing::debug!(
            url = %self.url,
            theaters = snapshot.postures.len(),
            cached = snapshot.cached,
            "Fetched theater posture"
        );

        Ok(Some(snapshot))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Source that reads a JSON snapshot from disk on every fetch
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PostureSource for FileSource {
    async fn fetch_cached_theater_posture(&self) -> PostureResult<Option<CachedTheaterPosture>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// In-memory source that answers with whatever it was last given
pub struct StaticSource {
    response: Mutex<PostureResult<Option<CachedTheaterPosture>>>,
    calls: AtomicUsize,
}

impl StaticSource {
    /// Source that always answers with `snapshot`
    pub fn new(snapshot: Option<CachedTheaterPosture>) -> Self {
        Self {
            response: Mutex::new(Ok(snapshot)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Source that has nothing to report
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Answer subsequent fetches with `snapshot`
    pub fn set_snapshot(&self, snapshot: Option<CachedTheaterPosture>) {
        *self.response.lock() = Ok(snapshot);
    }

    /// Fail subsequent fetches with `error`
    pub fn fail_with(&self, error: PostureError) {
        *self.response.lock() = Err(error);
    }

    /// Number of fetches served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostureSource for StaticSource {
    async fn fetch_cached_theater_posture(&self) -> PostureResult<Option<CachedTheaterPosture>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().clone()
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as HttpStatus, routing::get, Json, Router};
    use posture_types::TheaterPostureSummary;

    /// Serve `router` on an ephemeral local port and return the snapshot URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/theater-posture", addr)
    }

    fn snapshot() -> CachedTheaterPosture {
        CachedTheaterPosture::new(vec![TheaterPostureSummary::new(
            "iran",
            "Iran Theater",
            "IRAN",
            32.0,
            53.0,
        )])
    }

    #[tokio::test]
    async fn test_static_source_counts_calls() {
        let source = StaticSource::new(Some(snapshot()));

        let first = source.fetch_cached_theater_posture().await.unwrap();
        assert_eq!(first.unwrap().postures.len(), 1);

        source.fail_with(PostureError::Upstream { status: 502 });
        let second = source.fetch_cached_theater_posture().await;
        assert!(matches!(second, Err(PostureError::Upstream { status: 502 })));

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_no_data() {
        let source = FileSource::new("/nonexistent/theater-posture.json");
        let result = source.fetch_cached_theater_posture().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_file_source_reads_snapshot() {
        let path = std::env::temp_dir().join(format!(
            "theater-posture-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, serde_json::to_string(&snapshot()).unwrap()).unwrap();

        let source = FileSource::new(&path);
        let result = source.fetch_cached_theater_posture().await.unwrap().unwrap();
        assert_eq!(result.postures[0].theater_id, "iran");

        std::fs::write(&path, "{ not json").unwrap();
        let err = source.fetch_cached_theater_posture().await.unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_http_source_transport_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let source = HttpPostureSource::new("http://127.0.0.1:9/api/theater-posture")
            .with_timeout(Duration::from_millis(500));
        let err = source.fetch_cached_theater_posture().await.unwrap_err();
        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    }

    #[tokio::test]
    async fn test_http_source_decodes_snapshot() {
        let body = snapshot();
        let url = serve(Router::new().route(
            "/api/theater-posture",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        ))
        .await;

        let result = HttpPostureSource::new(url)
            .fetch_cached_theater_posture()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.postures[0].theater_id, "iran");
    }

    #[tokio::test]
    async fn test_http_source_no_content_is_no_data() {
        let url = serve(Router::new().route(
            "/api/theater-posture",
            get(|| async { HttpStatus::NO_CONTENT }),
        ))
        .await;

        let result = HttpPostureSource::new(url)
            .fetch_cached_theater_posture()
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_http_source_error_status() {
        let url = serve(Router::new().route(
            "/api/theater-posture",
            get(|| async { (HttpStatus::SERVICE_UNAVAILABLE, "aggregation pending") }),
        ))
        .await;

        let err = HttpPostureSource::new(url)
            .fetch_cached_theater_posture()
            .await
            .unwrap_err();
        assert!(matches!(err, PostureError::Upstream { status: 503 }));
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_http_source_malformed_body() {
        let url = serve(Router::new().route(
            "/api/theater-posture",
            get(|| async { "{ not json" }),
        ))
        .await;

        let err = HttpPostureSource::new(url)
            .fetch_cached_theater_posture()
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "DECODE_ERROR");
    }
}
