//! Horse Race - Simulation core
//!
//! Multi-agent horse racing on an oval track. A renderer owns a
//! [`RaceDriver`] (or a bare [`Race`]), feeds it frame deltas and draws the
//! returned [`RaceSnapshot`].

pub mod race_sim;

pub use race_sim::{
    ConfigError, GameState, HorseState, Race, RaceConfig, RaceDriver, RaceResult, RaceSnapshot,
    RaceStatus, RunningStyle, TrackConfig, TrackGeometry, Vec2,
};

/// Build a race on `track` with `roster_size` horses and default tuning.
pub fn create_race(track: TrackConfig, roster_size: usize) -> Result<Race, ConfigError> {
    Race::new(RaceConfig {
        roster_size,
        track,
        ..Default::default()
    })
}
