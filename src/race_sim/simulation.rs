//! Simulation - Frame-callback race driver
//!
//! Owns the active race, turns renderer frame deltas into race ticks and
//! keeps the lifecycle state the UI polls.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;

use crate::race_sim::config::RaceConfig;
use crate::race_sim::error::ConfigError;
use crate::race_sim::race::{Race, RaceResult, RaceSnapshot, RaceStatus};

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Idle,
    Ready,
    Racing,
    Results,
}

/// Driver statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverStats {
    pub tick_count: u64,
    pub avg_tick_time_ms: f64,
    pub horse_count: u32,
    pub game_state: GameState,
    pub paused: bool,
}

/// Owns one race and steps it once per renderer frame
pub struct RaceDriver {
    state: GameState,
    race: Option<Race>,
    /// Wall-clock cost of recent ticks, milliseconds
    tick_times: VecDeque<f64>,
    tick_count: u64,
    paused: bool,
}

impl RaceDriver {
    const TICK_WINDOW: usize = 60;

    /// Create an idle driver with no race
    pub fn new() -> Self {
        Self {
            state: GameState::Idle,
            race: None,
            tick_times: VecDeque::with_capacity(Self::TICK_WINDOW),
            tick_count: 0,
            paused: false,
        }
    }

    /// Build a race and line it up at the gate.
    pub fn init_race(&mut self, config: RaceConfig) -> Result<(), ConfigError> {
        let race = Race::new(config)?;
        self.race = Some(race);
        self.state = GameState::Ready;
        self.paused = false;
        self.tick_times.clear();
        self.tick_count = 0;
        Ok(())
    }

    /// Open the gate. Ignored unless a race is ready.
    pub fn start_race(&mut self) {
        if self.state != GameState::Ready {
            return;
        }
        if let Some(race) = &mut self.race {
            race.start();
            self.state = GameState::Racing;
        }
    }

    /// Advance by one renderer frame. Returns the state to draw, which is
    /// unchanged while paused.
    pub fn frame(&mut self, dt: f64) -> Option<RaceSnapshot> {
        if self.state == GameState::Racing && !self.paused {
            if let Some(race) = &mut self.race {
                let tick_start = Instant::now();
                race.tick(dt);
                let tick_time = tick_start.elapsed().as_secs_f64() * 1000.0;

                self.tick_count += 1;
                self.tick_times.push_back(tick_time);
                if self.tick_times.len() > Self::TICK_WINDOW {
                    self.tick_times.pop_front();
                }

                if race.status == RaceStatus::Finished {
                    self.state = GameState::Results;
                }
            }
        }

        self.snapshot()
    }

    /// Current state to draw
    pub fn snapshot(&self) -> Option<RaceSnapshot> {
        self.race.as_ref().map(Race::snapshot)
    }

    /// Finishers so far, in placing order
    pub fn results(&self) -> Option<Vec<RaceResult>> {
        self.race.as_ref().map(|race| race.finish_order().to_vec())
    }

    pub fn race(&self) -> Option<&Race> {
        self.race.as_ref()
    }

    /// Tick counters and average tick cost
    pub fn stats(&self) -> DriverStats {
        let avg_tick_time_ms = if self.tick_times.is_empty() {
            0.0
        } else {
            self.tick_times.iter().sum::<f64>() / self.tick_times.len() as f64
        };

        DriverStats {
            tick_count: self.tick_count,
            avg_tick_time_ms,
            horse_count: self.race.as_ref().map_or(0, |race| race.horses().len() as u32),
            game_state: self.state,
            paused: self.paused,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Drop the race and return to idle
    pub fn reset(&mut self) {
        self.state = GameState::Idle;
        self.race = None;
        self.paused = false;
        self.tick_times.clear();
        self.tick_count = 0;
        log::debug!("Race driver reset");
    }

    /// Stop advancing while racing
    pub fn pause(&mut self) {
        if self.state == GameState::Racing && !self.paused {
            self.paused = true;
            log::debug!("Race paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            log::debug!("Race resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for RaceDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RaceConfig {
        RaceConfig {
            roster_size: 4,
            seed: Some(9),
            ..Default::default()
        }
    }

    #[test]
    fn lifecycle_runs_idle_ready_racing() {
        let mut driver = RaceDriver::new();
        assert_eq!(driver.state(), GameState::Idle);
        assert!(driver.frame(1.0 / 60.0).is_none());

        driver.init_race(config()).unwrap();
        assert_eq!(driver.state(), GameState::Ready);
        driver.frame(1.0 / 60.0);
        assert_eq!(driver.stats().tick_count, 0);

        driver.start_race();
        assert_eq!(driver.state(), GameState::Racing);
        let snapshot = driver.frame(1.0 / 60.0).unwrap();
        assert_eq!(snapshot.status, RaceStatus::Racing);
        assert_eq!(snapshot.horses.len(), 4);
        assert_eq!(driver.stats().tick_count, 1);
    }

    #[test]
    fn paused_frames_do_not_advance_the_race() {
        let mut driver = RaceDriver::new();
        driver.init_race(config()).unwrap();
        driver.start_race();
        driver.frame(1.0 / 60.0);

        driver.pause();
        assert!(driver.is_paused());
        let frozen = driver.snapshot();
        for _ in 0..10 {
            assert_eq!(driver.frame(1.0 / 60.0), frozen);
        }

        driver.resume();
        let moved = driver.frame(1.0 / 60.0);
        assert_ne!(moved, frozen);
    }

    #[test]
    fn tick_window_is_bounded() {
        let mut driver = RaceDriver::new();
        driver.init_race(config()).unwrap();
        driver.start_race();
        for _ in 0..100 {
            driver.frame(1.0 / 60.0);
        }
        let stats = driver.stats();
        assert_eq!(stats.tick_count, 100);
        assert_eq!(driver.tick_times.len(), 60);
        assert!(stats.avg_tick_time_ms >= 0.0);
        assert_eq!(stats.horse_count, 4);
    }

    #[test]
    fn invalid_config_leaves_driver_idle() {
        let mut driver = RaceDriver::new();
        let result = driver.init_race(RaceConfig {
            roster_size: 0,
            ..Default::default()
        });
        assert_eq!(result, Err(ConfigError::EmptyRoster));
        assert_eq!(driver.state(), GameState::Idle);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut driver = RaceDriver::new();
        driver.init_race(config()).unwrap();
        driver.start_race();
        driver.frame(1.0 / 60.0);
        driver.reset();
        assert_eq!(driver.state(), GameState::Idle);
        assert!(driver.snapshot().is_none());
        assert!(driver.results().is_none());
        assert_eq!(driver.stats().tick_count, 0);
    }
}
