//! Error - configuration validation failures
//!
//! The simulation has no fallible I/O. Only a bad configuration can stop a
//! race from being built.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("curve radius {curve_radius} must exceed half the lane width ({lane_width} / 2)")]
    CurveTooTight { curve_radius: f64, lane_width: f64 },

    #[error("track width {track_width} leaves no straight between the curves (needs more than {required})")]
    TrackTooNarrow { track_width: f64, required: f64 },

    #[error("track height {track_height} cannot hold the curve diameter {required}")]
    TrackTooShort { track_height: f64, required: f64 },

    #[error("{line} line offset {offset} falls outside the straight (max {max})")]
    LineOffStraight {
        line: &'static str,
        offset: f64,
        max: f64,
    },

    #[error("race needs at least one horse")]
    EmptyRoster,

    #[error("checkpoint ring needs at least 2 checkpoints, got {count}")]
    TooFewCheckpoints { count: usize },

    #[error("race needs at least one lap")]
    NoLaps,

    #[error("vision fan has no rays")]
    EmptyVisionFan,
}
