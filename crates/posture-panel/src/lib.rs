//! Posture Panel - Theater posture dashboard widget
//!
//! This crate provides the strategic posture panel: a component that polls a
//! cached per-theater aircraft summary, keeps the last good snapshot, and
//! renders it as an HTML fragment with severity badges, role breakdowns and
//! trend indicators.
//!
//! # Layers
//!
//! - **Panel** (`panel`): the base panel abstraction the component renders
//!   into (content replacement, notification badge, teardown)
//! - **Source** (`source`): where snapshots come from (HTTP, file, in-memory)
//! - **View** (`view`): sort and badge policy, and the per-theater view model
//! - **Render** (`render`): HTML assembly with escaping of external text
//! - **Controller** (`controller`): lifecycle, recurring refresh timer, click
//!   handling
//!
//! # Example
//!
//! ```ignore
//! use posture_panel::{HtmlPanel, HttpPostureSource, PanelConfig, PosturePanel};
//!
//! let panel = Arc::new(HtmlPanel::new("strategic-posture", "AI Strategic Posture"));
//! let source = Arc::new(HttpPostureSource::new("http://localhost:3000/api/theater-posture"));
//!
//! let posture = PosturePanel::start(panel.clone(), source, PanelConfig::default());
//! posture.set_location_click_handler(|lat, lon| println!("focus map on {lat},{lon}"));
//!
//! // later
//! posture.destroy();
//! ```

pub mod panel;
pub mod source;
pub mod view;
pub mod render;
pub mod controller;

pub use panel::{HtmlPanel, Panel, PanelBadge};
pub use source::{FileSource, HttpPostureSource, PostureSource, StaticSource};
pub use view::{compute_badge, sort_by_severity, PostureView, TheaterDisplay, TheaterView, TrendIndicator};
pub use render::escape_html;
pub use controller::{
    LocationClickHandler, PanelConfig, PanelState, PanelStatus, PosturePanel,
    DEFAULT_REFRESH_INTERVAL,
};

// Re-export core types
pub use posture_types::{
    AircraftRole, CachedTheaterPosture, PostureError, PostureLevel, PostureResult, PostureTrend,
    TheaterPostureSummary,
};
