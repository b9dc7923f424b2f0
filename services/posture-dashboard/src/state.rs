//! Application state shared across handlers
//!
//! Holds the hosted posture panel, the HTML panel it renders into, and the
//! map focus set by theater clicks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use posture_panel::{
    FileSource, HtmlPanel, HttpPostureSource, PanelConfig, PosturePanel, PostureSource,
    StaticSource,
};

use crate::config::{PanelSettings, SourceSettings};

/// Location the map was last asked to center on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapFocus {
    pub lat: f64,
    pub lon: f64,
    pub focused_at: DateTime<Utc>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Posture controller
    pub posture: Arc<PosturePanel>,
    /// Panel the controller renders into
    pub html: Arc<HtmlPanel>,
    /// Last clicked theater center
    pub focus: Arc<RwLock<Option<MapFocus>>>,
}

impl AppState {
    /// Build the panel around `source` and wire the location-click handler.
    ///
    /// With `poll` set the panel fetches immediately and on every refresh
    /// period; this needs a running tokio runtime.
    pub fn new(source: Arc<dyn PostureSource>, settings: &PanelSettings, poll: bool) -> Self {
        let html = Arc::new(HtmlPanel::new(settings.id.clone(), settings.title.clone()));
        let config = PanelConfig::with_refresh_interval(settings.refresh_interval());

        let posture = if poll {
            PosturePanel::start(html.clone(), source, config)
        } else {
            PosturePanel::new(html.clone(), source, config)
        };

        let focus = Arc::new(RwLock::new(None));
        let recorder = focus.clone();
        posture.set_location_click_handler(move |lat, lon| {
            tracing::info!(lat, lon, "Focusing map on theater");
            *recorder.write() = Some(MapFocus {
                lat,
                lon,
                focused_at: Utc::now(),
            });
        });

        Self {
            posture,
            html,
            focus,
        }
    }

    /// Current map focus
    pub fn map_focus(&self) -> Option<MapFocus> {
        *self.focus.read()
    }
}

/// Pick the snapshot source for the configured settings
pub fn build_source(settings: &SourceSettings) -> Arc<dyn PostureSource> {
    if let Some(path) = &settings.fixture_path {
        tracing::info!(path = %path.display(), "Serving theater posture from fixture file");
        return Arc::new(FileSource::new(path.clone()));
    }

    if let Some(url) = &settings.upstream_url {
        tracing::info!(url = %url, "Polling theater posture from upstream service");
        return Arc::new(
            HttpPostureSource::new(url.clone()).with_timeout(settings.request_timeout()),
        );
    }

    tracing::info!("No posture source configured, panel will only show pushed snapshots");
    Arc::new(StaticSource::empty())
}
