//! View model for the posture panel
//!
//! Everything the renderer needs is decided here: theater order, which
//! theaters get the detailed breakdown, which role rows exist, trend text,
//! and the header badge. The renderer only assembles markup.

use chrono::{DateTime, Utc};
use serde::Serialize;

use posture_types::{AircraftRole, PostureLevel, PostureTrend, TheaterPostureSummary};

use crate::panel::PanelBadge;

/// Order summaries by severity, critical first, keeping input order within a level
pub fn sort_by_severity(postures: &[TheaterPostureSummary]) -> Vec<TheaterPostureSummary> {
    let mut sorted = postures.to_vec();
    // slice::sort_by_key is stable
    sorted.sort_by_key(|p| p.posture_level.rank());
    sorted
}

/// Badge for a set of summaries: urgent on any critical, plain on any elevated
pub fn compute_badge(postures: &[TheaterPostureSummary]) -> Option<PanelBadge> {
    let count_at = |level: PostureLevel| {
        postures
            .iter()
            .filter(|p| p.posture_level == level)
            .count()
    };

    let critical = count_at(PostureLevel::Critical);
    if critical > 0 {
        return Some(PanelBadge::urgent(critical));
    }

    let elevated = count_at(PostureLevel::Elevated);
    if elevated > 0 {
        return Some(PanelBadge::non_urgent(elevated));
    }

    None
}

/// Trend arrow and text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "direction", content = "percent", rename_all = "lowercase")]
pub enum TrendIndicator {
    Up(f64),
    Down(f64),
    Stable,
}

impl TrendIndicator {
    pub fn from_summary(summary: &TheaterPostureSummary) -> Self {
        match summary.trend {
            PostureTrend::Increasing => TrendIndicator::Up(summary.change_percent),
            PostureTrend::Decreasing => TrendIndicator::Down(summary.change_percent),
            PostureTrend::Stable => TrendIndicator::Stable,
        }
    }

    /// Display text. The decreasing percent is shown exactly as reported.
    pub fn text(&self) -> String {
        match self {
            TrendIndicator::Up(pct) => format!("↑ +{}%", pct),
            TrendIndicator::Down(pct) => format!("↓ {}%", pct),
            TrendIndicator::Stable => "→ stable".to_string(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TrendIndicator::Up(_) => "trend-up",
            TrendIndicator::Down(_) => "trend-down",
            TrendIndicator::Stable => "trend-stable",
        }
    }
}

/// One breakdown row in an expanded theater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleRow {
    pub role: AircraftRole,
    pub count: u32,
}

/// How a theater is laid out
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TheaterDisplay {
    /// Short name, badge and total only
    Compact,
    /// Full breakdown for elevated and critical theaters
    Expanded {
        rows: Vec<RoleRow>,
        strike_capable: bool,
        trend: TrendIndicator,
        target_nation: Option<String>,
    },
}

/// Display data for one theater
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TheaterView {
    pub theater_id: String,
    /// Short name for compact theaters, full name for expanded ones
    pub name: String,
    pub level: PostureLevel,
    pub total_aircraft: u32,
    pub center_lat: f64,
    pub center_lon: f64,
    pub display: TheaterDisplay,
}

impl TheaterView {
    pub fn from_summary(summary: &TheaterPostureSummary) -> Self {
        let (name, display) = if summary.posture_level.is_heightened() {
            let rows = summary
                .role_counts()
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(role, count)| RoleRow { role, count })
                .collect();

            (
                summary.theater_name.clone(),
                TheaterDisplay::Expanded {
                    rows,
                    strike_capable: summary.strike_capable,
                    trend: TrendIndicator::from_summary(summary),
                    target_nation: summary.target_nation.clone(),
                },
            )
        } else {
            (summary.short_name.clone(), TheaterDisplay::Compact)
        };

        Self {
            theater_id: summary.theater_id.clone(),
            name,
            level: summary.posture_level,
            total_aircraft: summary.total_aircraft,
            center_lat: summary.center_lat,
            center_lon: summary.center_lon,
            display,
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.display, TheaterDisplay::Expanded { .. })
    }
}

/// Everything rendered for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostureView {
    pub theaters: Vec<TheaterView>,
    pub total_flights: u32,
    pub last_updated: DateTime<Utc>,
}

impl PostureView {
    /// Build the view; `now` stands in for a missing snapshot timestamp
    pub fn build(
        postures: &[TheaterPostureSummary],
        total_flights: u32,
        timestamp: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            theaters: sort_by_severity(postures)
                .iter()
                .map(TheaterView::from_summary)
                .collect(),
            total_flights,
            last_updated: timestamp.unwrap_or(now),
        }
    }
}
