//! Posture Types - Canonical data model for theater posture snapshots
//!
//! This crate contains the types exchanged between the aggregation service
//! and the posture panel, with zero dependencies on other posture crates:
//!
//! - Per-theater summaries (`TheaterPostureSummary`)
//! - Posture levels and trends (`PostureLevel`, `PostureTrend`)
//! - Timestamped snapshots (`CachedTheaterPosture`)
//! - The shared error type (`PostureError`)
//!
//! All wire types serialize with camelCase field names, matching the JSON
//! produced by the aggregation service.

pub mod theater;
pub mod error;

pub use theater::*;
pub use error::*;
