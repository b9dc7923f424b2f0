//! Theater posture types
//!
//! A snapshot is produced by the aggregation service and read, never
//! modified, by the panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a theater's current posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostureLevel {
    Normal,
    Elevated,
    Critical,
    /// Any level string this build does not know about
    #[serde(other)]
    Unknown,
}

impl PostureLevel {
    /// Sort rank, lowest first. Unknown levels rank with normal.
    pub fn rank(&self) -> u8 {
        match self {
            PostureLevel::Critical => 0,
            PostureLevel::Elevated => 1,
            PostureLevel::Normal | PostureLevel::Unknown => 2,
        }
    }

    /// Whether the theater gets the detailed breakdown
    pub fn is_heightened(&self) -> bool {
        matches!(self, PostureLevel::Elevated | PostureLevel::Critical)
    }

    /// Short badge label
    pub fn label(&self) -> &'static str {
        match self {
            PostureLevel::Critical => "CRIT",
            PostureLevel::Elevated => "ELEV",
            PostureLevel::Normal => "NORM",
            PostureLevel::Unknown => "UNKN",
        }
    }

    /// Lowercase name, also used as the CSS modifier
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureLevel::Critical => "critical",
            PostureLevel::Elevated => "elevated",
            PostureLevel::Normal => "normal",
            PostureLevel::Unknown => "unknown",
        }
    }
}

impl Default for PostureLevel {
    fn default() -> Self {
        PostureLevel::Normal
    }
}

impl fmt::Display for PostureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of activity relative to the previous aggregation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostureTrend {
    Increasing,
    Decreasing,
    /// Unrecognized trend strings are read as stable
    #[serde(other)]
    Stable,
}

impl Default for PostureTrend {
    fn default() -> Self {
        PostureTrend::Stable
    }
}

/// Aircraft roles counted per theater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftRole {
    Fighter,
    Tanker,
    Awacs,
    Reconnaissance,
    Transport,
    Bomber,
}

impl AircraftRole {
    /// Display order of the breakdown rows
    pub const ALL: [AircraftRole; 6] = [
        AircraftRole::Fighter,
        AircraftRole::Tanker,
        AircraftRole::Awacs,
        AircraftRole::Reconnaissance,
        AircraftRole::Transport,
        AircraftRole::Bomber,
    ];

    /// Row label
    pub fn label(&self) -> &'static str {
        match self {
            AircraftRole::Fighter => "Fighters",
            AircraftRole::Tanker => "Tankers",
            AircraftRole::Awacs => "AWACS",
            AircraftRole::Reconnaissance => "Recon",
            AircraftRole::Transport => "Transport",
            AircraftRole::Bomber => "Bombers",
        }
    }

    /// Row icon
    pub fn icon(&self) -> &'static str {
        match self {
            AircraftRole::Fighter => "✈",
            AircraftRole::Tanker => "⛽",
            AircraftRole::Awacs => "📡",
            AircraftRole::Reconnaissance => "🔍",
            AircraftRole::Transport => "📦",
            AircraftRole::Bomber => "💣",
        }
    }
}

/// One theater's posture snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheaterPostureSummary {
    /// Stable theater identifier
    pub theater_id: String,
    /// Full theater name
    pub theater_name: String,
    /// Short display name
    pub short_name: String,
    /// Geographic center latitude
    pub center_lat: f64,
    /// Geographic center longitude
    pub center_lon: f64,
    #[serde(default)]
    pub fighters: u32,
    #[serde(default)]
    pub tankers: u32,
    #[serde(default)]
    pub awacs: u32,
    #[serde(default)]
    pub reconnaissance: u32,
    #[serde(default)]
    pub transport: u32,
    #[serde(default)]
    pub bombers: u32,
    /// Total aircraft observed in the theater
    #[serde(default)]
    pub total_aircraft: u32,
    #[serde(default)]
    pub posture_level: PostureLevel,
    #[serde(default)]
    pub trend: PostureTrend,
    /// Percent change over the previous window, signed by the producer
    #[serde(default)]
    pub change_percent: f64,
    #[serde(default)]
    pub strike_capable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_nation: Option<String>,
}

impl TheaterPostureSummary {
    /// Create a normal-level summary with no aircraft
    pub fn new(
        theater_id: impl Into<String>,
        theater_name: impl Into<String>,
        short_name: impl Into<String>,
        center_lat: f64,
        center_lon: f64,
    ) -> Self {
        Self {
            theater_id: theater_id.into(),
            theater_name: theater_name.into(),
            short_name: short_name.into(),
            center_lat,
            center_lon,
            fighters: 0,
            tankers: 0,
            awacs: 0,
            reconnaissance: 0,
            transport: 0,
            bombers: 0,
            total_aircraft: 0,
            posture_level: PostureLevel::Normal,
            trend: PostureTrend::Stable,
            change_percent: 0.0,
            strike_capable: false,
            target_nation: None,
        }
    }

    /// Set the posture level
    pub fn with_level(mut self, level: PostureLevel) -> Self {
        self.posture_level = level;
        self
    }

    /// Set the count for one role and recompute the total
    pub fn with_role(mut self, role: AircraftRole, count: u32) -> Self {
        match role {
            AircraftRole::Fighter => self.fighters = count,
            AircraftRole::Tanker => self.tankers = count,
            AircraftRole::Awacs => self.awacs = count,
            AircraftRole::Reconnaissance => self.reconnaissance = count,
            AircraftRole::Transport => self.transport = count,
            AircraftRole::Bomber => self.bombers = count,
        }
        self.total_aircraft = self.role_counts().iter().map(|(_, n)| n).sum();
        self
    }

    /// Set trend and percent change
    pub fn with_trend(mut self, trend: PostureTrend, change_percent: f64) -> Self {
        self.trend = trend;
        self.change_percent = change_percent;
        self
    }

    /// Mark the theater as strike capable
    pub fn strike_capable(mut self) -> Self {
        self.strike_capable = true;
        self
    }

    /// Set the nation the activity is oriented toward
    pub fn with_target_nation(mut self, nation: impl Into<String>) -> Self {
        self.target_nation = Some(nation.into());
        self
    }

    /// Count for a single role
    pub fn role_count(&self, role: AircraftRole) -> u32 {
        match role {
            AircraftRole::Fighter => self.fighters,
            AircraftRole::Tanker => self.tankers,
            AircraftRole::Awacs => self.awacs,
            AircraftRole::Reconnaissance => self.reconnaissance,
            AircraftRole::Transport => self.transport,
            AircraftRole::Bomber => self.bombers,
        }
    }

    /// All role counts in display order
    pub fn role_counts(&self) -> [(AircraftRole, u32); 6] {
        AircraftRole::ALL.map(|role| (role, self.role_count(role)))
    }
}

/// Timestamped collection of theater summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTheaterPosture {
    #[serde(default)]
    pub postures: Vec<TheaterPostureSummary>,
    /// Flights considered by the aggregation run
    #[serde(default)]
    pub total_flights: u32,
    /// When the aggregation ran
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the service answered from its cache
    #[serde(default)]
    pub cached: bool,
}

impl CachedTheaterPosture {
    /// Create a snapshot stamped with the current time
    pub fn new(postures: Vec<TheaterPostureSummary>) -> Self {
        let total_flights = postures.iter().map(|p| p.total_aircraft).sum();
        Self {
            postures,
            total_flights,
            timestamp: Some(Utc::now()),
            cached: false,
        }
    }

    /// Override the snapshot timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.postures.is_empty()
    }
}
