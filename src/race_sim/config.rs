//! Config - Race, track and perception constants
//!
//! Every value here is fixed for the lifetime of a race. `Default` holds the
//! reference tuning; collaborators may load overrides from JSON.

use serde::{Deserialize, Serialize};

use crate::race_sim::error::ConfigError;

/// Oval track dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Total width of the track area
    pub track_width: f64,
    /// Total height of the track area
    pub track_height: f64,
    /// Width of the racing surface, inner rail to outer rail
    pub lane_width: f64,
    /// Radius to the center of the lane in the curves
    pub curve_radius: f64,
    /// Start line distance right of the track center (bottom straight)
    pub start_line_offset: f64,
    /// Finish line distance left of the track center (top straight)
    pub finish_line_offset: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            track_width: 2400.0,
            track_height: 1200.0,
            lane_width: 180.0,
            curve_radius: 300.0,
            start_line_offset: 200.0,
            finish_line_offset: 200.0,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("track_width", self.track_width)?;
        positive("track_height", self.track_height)?;
        positive("lane_width", self.lane_width)?;
        positive("curve_radius", self.curve_radius)?;

        if self.curve_radius <= self.lane_width / 2.0 {
            return Err(ConfigError::CurveTooTight {
                curve_radius: self.curve_radius,
                lane_width: self.lane_width,
            });
        }

        let outer_radius = self.curve_radius + self.lane_width / 2.0;
        if self.track_width <= outer_radius * 2.0 {
            return Err(ConfigError::TrackTooNarrow {
                track_width: self.track_width,
                required: outer_radius * 2.0,
            });
        }
        if self.track_height < outer_radius * 2.0 {
            return Err(ConfigError::TrackTooShort {
                track_height: self.track_height,
                required: outer_radius * 2.0,
            });
        }

        let half_straight = (self.track_width - outer_radius * 2.0) / 2.0;
        for (line, offset) in [
            ("start", self.start_line_offset),
            ("finish", self.finish_line_offset),
        ] {
            if !offset.is_finite() || offset.abs() >= half_straight {
                return Err(ConfigError::LineOffStraight {
                    line,
                    offset,
                    max: half_straight,
                });
            }
        }
        Ok(())
    }
}

/// Perception ranges shared by every horse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Radius of the proximity set
    pub proximity_radius: f64,
    /// How far ahead the wit lookahead point is projected
    pub wit_level: f64,
    /// Capture radius around the wit lookahead point
    pub wit_radius: f64,
    /// Maximum vision ray range
    pub vision_length: f64,
    /// Ray offsets relative to the heading, degrees
    pub vision_angles: Vec<f64>,
    /// First sample distance along a ray
    pub ray_start: f64,
    /// Distance between ray samples
    pub ray_step: f64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            proximity_radius: 45.0,
            wit_level: 100.0,
            wit_radius: 40.0,
            vision_length: 200.0,
            vision_angles: vec![-30.0, -15.0, 0.0, 15.0, 30.0],
            ray_start: 10.0,
            ray_step: 5.0,
        }
    }
}

impl PerceptionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("proximity_radius", self.proximity_radius)?;
        positive("wit_level", self.wit_level)?;
        positive("wit_radius", self.wit_radius)?;
        positive("vision_length", self.vision_length)?;
        positive("ray_start", self.ray_start)?;
        positive("ray_step", self.ray_step)?;
        if self.vision_angles.is_empty() {
            return Err(ConfigError::EmptyVisionFan);
        }
        Ok(())
    }
}

/// Checkpoint ring used for lap counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub count: usize,
    pub radius: f64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            count: 8,
            radius: 100.0,
        }
    }
}

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Number of horses
    pub roster_size: usize,
    /// Times the finish line must be reached
    pub laps: u32,
    /// RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Largest simulated step, seconds
    pub max_dt: f64,
    /// Time scale factor applied before clamping
    pub time_scale: f64,
    /// Seconds after the start during which horses do not steer
    pub grace_period: f64,
    /// Enables inner rail hugging
    pub rail_hugging: bool,
    /// Overrun past the race length that counts as a finish without a line crossing
    pub finish_tolerance: f64,
    pub track: TrackConfig,
    pub perception: PerceptionConfig,
    pub checkpoints: CheckpointConfig,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            roster_size: 10,
            laps: 2,
            seed: None,
            max_dt: 0.1,
            time_scale: 1.0,
            grace_period: 1.0,
            rail_hugging: false,
            finish_tolerance: 30.0,
            track: TrackConfig::default(),
            perception: PerceptionConfig::default(),
            checkpoints: CheckpointConfig::default(),
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.track.validate()?;
        self.perception.validate()?;

        if self.roster_size == 0 {
            return Err(ConfigError::EmptyRoster);
        }
        if self.laps == 0 {
            return Err(ConfigError::NoLaps);
        }
        if self.checkpoints.count < 2 {
            return Err(ConfigError::TooFewCheckpoints {
                count: self.checkpoints.count,
            });
        }
        positive("checkpoints.radius", self.checkpoints.radius)?;
        positive("max_dt", self.max_dt)?;
        positive("time_scale", self.time_scale)?;
        positive("finish_tolerance", self.finish_tolerance)?;
        if !self.grace_period.is_finite() || self.grace_period < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "grace_period",
                value: self.grace_period,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
