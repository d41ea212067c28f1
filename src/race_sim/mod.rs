//! Race Simulation Module
//!
//! Oval-track horse racing: geometry, per-horse perception and steering,
//! stamina-driven kinetics, and the race loop that ties them together.

pub mod vector;
pub mod error;
pub mod config;
pub mod track;
pub mod checkpoint;
pub mod stats;
pub mod horse;
pub mod perception;
pub mod decision;
pub mod kinetics;
pub mod race;
pub mod simulation;

pub use config::{CheckpointConfig, PerceptionConfig, RaceConfig, TrackConfig};
pub use error::ConfigError;
pub use horse::{HorseSnapshot, HorseState};
pub use race::{Race, RaceResult, RaceSnapshot, RaceStatus};
pub use simulation::{DriverStats, GameState, RaceDriver};
pub use stats::RunningStyle;
pub use track::{SpawnPoint, TrackGeometry};
pub use vector::Vec2;
