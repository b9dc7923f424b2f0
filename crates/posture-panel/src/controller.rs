//! Posture panel controller
//!
//! Owns the last good snapshot, the recurring refresh timer and the
//! location-click handler. Every fetch, push or failure replaces the whole
//! panel content.
//!
//! Overlapping fetches (a manual refresh while a timer fetch is in flight)
//! are not serialized: whichever resolves last is what the panel shows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use posture_types::{CachedTheaterPosture, PostureError, PostureLevel, TheaterPostureSummary};

use crate::panel::{Panel, PanelBadge};
use crate::render;
use crate::source::PostureSource;
use crate::view::{compute_badge, PostureView};

/// Refresh period used when none is configured
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Callback invoked with a theater's center when it is clicked
pub type LocationClickHandler = Arc<dyn Fn(f64, f64) + Send + Sync>;

/// Panel configuration
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Period of the recurring refresh
    pub refresh_interval: Duration,
}

impl PanelConfig {
    /// Config with a custom period; a zero period falls back to the default
    pub fn with_refresh_interval(refresh_interval: Duration) -> Self {
        if refresh_interval.is_zero() {
            return Self::default();
        }
        Self { refresh_interval }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Lifecycle state of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    /// Waiting for the first result
    Loading,
    /// Showing a snapshot
    Rendered,
    /// Last result had no theaters
    NoData,
    /// Last fetch failed
    Error,
    /// Torn down
    Destroyed,
}

/// Point-in-time summary of the panel for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PanelStatus {
    pub state: PanelState,
    pub badge: Option<PanelBadge>,
    pub theater_count: usize,
    pub critical_count: usize,
    pub elevated_count: usize,
    pub total_flights: u32,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_error_code: Option<&'static str>,
    pub refresh_interval_secs: u64,
}

struct PanelInner {
    state: PanelState,
    postures: Vec<TheaterPostureSummary>,
    total_flights: u32,
    last_updated: Option<DateTime<Utc>>,
    badge: Option<PanelBadge>,
    last_error: Option<PostureError>,
}

/// Strategic posture panel
pub struct PosturePanel {
    panel: Arc<dyn Panel>,
    source: Arc<dyn PostureSource>,
    config: PanelConfig,
    inner: RwLock<PanelInner>,
    timer: Mutex<Option<JoinHandle<()>>>,
    location_handler: RwLock<Option<LocationClickHandler>>,
    destroyed: AtomicBool,
}

impl PosturePanel {
    /// Create the panel showing the loading placeholder, without polling
    pub fn new(
        panel: Arc<dyn Panel>,
        source: Arc<dyn PostureSource>,
        config: PanelConfig,
    ) -> Arc<Self> {
        panel.set_content(render::render_loading());

        Arc::new(Self {
            panel,
            source,
            config,
            inner: RwLock::new(PanelInner {
                state: PanelState::Loading,
                postures: Vec::new(),
                total_flights: 0,
                last_updated: None,
                badge: None,
                last_error: None,
            }),
            timer: Mutex::new(None),
            location_handler: RwLock::new(None),
            destroyed: AtomicBool::new(false),
        })
    }

    /// Create the panel, fetch once right away and keep refreshing on the
    /// configured period until [`destroy`](Self::destroy).
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        panel: Arc<dyn Panel>,
        source: Arc<dyn PostureSource>,
        config: PanelConfig,
    ) -> Arc<Self> {
        let this = Self::new(panel, source, config);
        this.spawn_timer();
        this
    }

    fn spawn_timer(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.config.refresh_interval;

        tracing::info!(
            source = self.source.name(),
            interval_secs = period.as_secs(),
            "Starting theater posture refresh"
        );

        // The first tick completes immediately and serves as the initial fetch
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let panel = match weak.upgrade() {
                    Some(panel) => panel,
                    None => break,
                };
                panel.refresh().await;
            }
        });

        *self.timer.lock() = Some(handle);
    }

    /// Fetch from the source and re-render
    pub async fn refresh(&self) -> PanelState {
        if self.is_destroyed() {
            return PanelState::Destroyed;
        }

        match self.source.fetch_cached_theater_posture().await {
            Ok(snapshot) => self.update(snapshot),
            Err(err) => self.show_error(err),
        }
    }

    /// Apply a snapshot obtained outside the polling loop
    pub fn update(&self, snapshot: Option<CachedTheaterPosture>) -> PanelState {
        // Held across the panel writes so the cache and the rendered view
        // always come from the same snapshot.
        let mut inner = self.inner.write();
        if self.is_destroyed() {
            return PanelState::Destroyed;
        }

        let snapshot = match snapshot {
            Some(snapshot) if !snapshot.is_empty() => snapshot,
            _ => {
                inner.state = PanelState::NoData;
                self.panel.set_content(render::render_no_data());
                tracing::debug!("Theater posture snapshot is empty");
                return PanelState::NoData;
            }
        };

        let badge = compute_badge(&snapshot.postures);
        let view = PostureView::build(
            &snapshot.postures,
            snapshot.total_flights,
            snapshot.timestamp,
            Utc::now(),
        );

        inner.state = PanelState::Rendered;
        inner.postures = snapshot.postures;
        inner.total_flights = snapshot.total_flights;
        inner.last_updated = snapshot.timestamp;
        inner.badge = badge;
        inner.last_error = None;

        self.panel.set_badge(badge);
        self.panel.set_content(render::render_view(&view));

        tracing::debug!(
            theaters = view.theaters.len(),
            urgent = badge.map(|b| b.urgent).unwrap_or(false),
            "Rendered theater posture"
        );

        PanelState::Rendered
    }

    fn show_error(&self, err: PostureError) -> PanelState {
        let mut inner = self.inner.write();
        if self.is_destroyed() {
            return PanelState::Destroyed;
        }

        tracing::warn!(
            source = self.source.name(),
            code = err.error_code(),
            error = %err,
            "Failed to fetch theater posture, will retry on next refresh"
        );

        inner.state = PanelState::Error;
        inner.last_error = Some(err);
        self.panel.set_content(render::render_error());

        PanelState::Error
    }

    /// Register the callback for theater clicks, replacing any previous one
    pub fn set_location_click_handler<F>(&self, handler: F)
    where
        F: Fn(f64, f64) + Send + Sync + 'static,
    {
        *self.location_handler.write() = Some(Arc::new(handler));
    }

    /// Handle a click on a theater element carrying `data-lat`/`data-lon`.
    ///
    /// Returns whether the handler was invoked. Unparseable coordinates or a
    /// missing handler make the click a no-op.
    pub fn handle_location_click(&self, lat: &str, lon: &str) -> bool {
        let (lat, lon) = match (parse_coordinate(lat), parse_coordinate(lon)) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return false,
        };

        let handler = self.location_handler.read().clone();
        match handler {
            Some(handler) => {
                handler(lat, lon);
                true
            }
            None => false,
        }
    }

    /// Click a rendered theater by id
    pub fn click_theater(&self, theater_id: &str) -> bool {
        let center = self
            .inner
            .read()
            .postures
            .iter()
            .find(|p| p.theater_id == theater_id)
            .map(|p| (p.center_lat.to_string(), p.center_lon.to_string()));

        match center {
            Some((lat, lon)) => self.handle_location_click(&lat, &lon),
            None => false,
        }
    }

    /// Stop the refresh timer and tear down the underlying panel. Safe to call
    /// more than once.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }

        {
            // Waits out any update in progress; later ones see the flag
            let mut inner = self.inner.write();
            inner.state = PanelState::Destroyed;
            self.panel.destroy();
        }

        tracing::info!("Theater posture panel destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Whether the recurring refresh is still scheduled
    pub fn has_timer(&self) -> bool {
        self.timer.lock().is_some()
    }

    pub fn state(&self) -> PanelState {
        self.inner.read().state
    }

    /// Last successfully applied summaries, in service order
    pub fn summaries(&self) -> Vec<TheaterPostureSummary> {
        self.inner.read().postures.clone()
    }

    pub fn badge(&self) -> Option<PanelBadge> {
        self.inner.read().badge
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.read().last_updated
    }

    /// Status snapshot for monitoring endpoints
    pub fn status(&self) -> PanelStatus {
        let inner = self.inner.read();
        let count_at = |level: PostureLevel| {
            inner
                .postures
                .iter()
                .filter(|p| p.posture_level == level)
                .count()
        };

        PanelStatus {
            state: inner.state,
            badge: inner.badge,
            theater_count: inner.postures.len(),
            critical_count: count_at(PostureLevel::Critical),
            elevated_count: count_at(PostureLevel::Elevated),
            total_flights: inner.total_flights,
            last_updated: inner.last_updated,
            last_error: inner.last_error.as_ref().map(|e| e.to_string()),
            last_error_code: inner.last_error.as_ref().map(|e| e.error_code()),
            refresh_interval_secs: self.config.refresh_interval.as_secs(),
        }
    }
}

impl Drop for PosturePanel {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}
