//! Race - Roster, tick order and finish detection
//!
//! Every tick runs in two phases. First each horse's perception is built
//! from a snapshot of the whole field, then each horse in roster order
//! decides, moves and is checked against the finish.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::race_sim::checkpoint::CheckpointRing;
use crate::race_sim::config::RaceConfig;
use crate::race_sim::decision::Steering;
use crate::race_sim::error::ConfigError;
use crate::race_sim::horse::{HorseSnapshot, HorseState};
use crate::race_sim::kinetics::{Course, Kinetics};
use crate::race_sim::perception::{AgentSnapshot, Perception};
use crate::race_sim::stats::{derive_stats, BaseStats, RunningStyle};
use crate::race_sim::track::{SpawnPoint, TrackGeometry};

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    NotStarted,
    Racing,
    Finished,
}

/// One line of the finish order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub horse_id: u32,
    pub number: u32,
    pub style: RunningStyle,
    pub finish_time: f64,
    pub position: u32,
}

/// A finish line crossing seen during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
struct Crossing {
    index: usize,
    id: u32,
    time: f64,
    race_distance: f64,
}

/// Complete race state
#[derive(Debug, Clone)]
pub struct Race {
    pub config: RaceConfig,
    pub status: RaceStatus,
    pub track: TrackGeometry,
    pub checkpoints: CheckpointRing,
    pub course: Course,
    /// Race clock, seconds since `start`
    pub elapsed_time: f64,
    horses: Vec<HorseState>,
    finish_order: Vec<RaceResult>,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Race {
    /// Build the track and roll a roster at the gate.
    pub fn new(config: RaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let track = TrackGeometry::new(&config.track)?;
        let checkpoints = CheckpointRing::around(&track, &config.checkpoints);
        let course = Course::new(&track, config.laps);
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let spawns = track.spawn_positions(config.roster_size);
        let mut horses = Vec::with_capacity(spawns.len());
        for (i, spawn) in spawns.into_iter().enumerate() {
            let style = RunningStyle::random(&mut rng);
            let stats = derive_stats(&BaseStats::roll(&mut rng), style);
            let mut horse = HorseState::new(i as u32, stats, spawn, &mut rng);
            Kinetics::update_distance(&mut horse, &track, &course);
            horses.push(horse);
        }

        log::info!(
            "Race created: {} horses, {} laps ({:.0} units), seed {}",
            horses.len(),
            config.laps,
            course.race_length,
            seed
        );

        Ok(Self {
            config,
            status: RaceStatus::NotStarted,
            track,
            checkpoints,
            course,
            elapsed_time: 0.0,
            horses,
            finish_order: Vec::new(),
            seed,
            rng,
        })
    }

    /// Put every horse in running state and reset the clock.
    pub fn start(&mut self) {
        self.status = RaceStatus::Racing;
        self.elapsed_time = 0.0;
        for horse in &mut self.horses {
            horse.start_running();
        }
        log::info!("Race started with {} horses", self.horses.len());
    }

    /// Move a horse to another gate slot before the start.
    pub fn place(&mut self, id: u32, spawn: SpawnPoint) -> bool {
        let Some(horse) = self.horses.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        horse.place(spawn);
        horse.circuits = 0;
        horse.track_distance = self.track.track_distance(spawn.position, 0);
        Kinetics::update_distance(horse, &self.track, &self.course);
        true
    }

    /// Advance by `dt` real seconds, scaled then clamped.
    pub fn tick(&mut self, dt: f64) {
        if self.status == RaceStatus::NotStarted {
            return;
        }
        let dt = dt * self.config.time_scale;
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.config.max_dt);
        let step_start = self.elapsed_time;
        self.elapsed_time += dt;

        // Phase 1: everyone observes the field as it stood last tick.
        let field: Vec<AgentSnapshot> = self.horses.iter().map(AgentSnapshot::from).collect();
        let views: Vec<Perception> = field
            .iter()
            .map(|me| Perception::observe(me, &field, &self.track, &self.config.perception))
            .collect();
        log::trace!(
            "tick {:.3}s: {} neighbor pairs, {} ahead pairs",
            self.elapsed_time,
            views.iter().map(|v| v.neighbors.len()).sum::<usize>(),
            views.iter().map(|v| v.ahead.len()).sum::<usize>()
        );

        // Phase 2: decide and move against the snapshot only.
        let proximity = self.config.perception.proximity_radius;
        let mut crossings = Vec::new();
        for (index, (horse, view)) in self.horses.iter_mut().zip(&views).enumerate() {
            if horse.running {
                horse.race_time += dt;
            }

            Steering::think(horse, view, &self.track, &self.config, &mut self.rng);
            Kinetics::sense_track(horse, &self.track);
            Steering::update_repositioning(horse, dt, &mut self.rng);
            Kinetics::update_stamina(horse, dt, &mut self.rng);
            Kinetics::update_velocity(horse, dt);
            Kinetics::integrate(horse, view, &self.track, proximity, dt);
            Kinetics::update_checkpoint(horse, &self.checkpoints);
            Kinetics::update_distance(horse, &self.track, &self.course);

            debug_assert!(
                horse.position.is_finite() && horse.steer_angle.is_finite() && horse.velocity.is_finite(),
                "horse {} left the tick with non-finite state",
                horse.number
            );

            if horse.running && !horse.finished {
                if let Some(fraction) = self.course.finish_crossing(horse, self.config.finish_tolerance) {
                    crossings.push(Crossing {
                        index,
                        id: horse.id,
                        time: step_start + fraction * dt,
                        race_distance: horse.race_distance,
                    });
                }
            }
        }

        self.record_finishers(crossings);

        if self.status == RaceStatus::Racing && self.finish_order.len() == self.horses.len() {
            self.status = RaceStatus::Finished;
            log::info!("Race complete in {}", format_time(self.elapsed_time));
        }
    }

    /// Place this tick's finishers by when they reached the line.
    fn record_finishers(&mut self, mut crossings: Vec<Crossing>) {
        order_crossings(&mut crossings);
        for crossing in crossings {
            let position = self.finish_order.len() as u32 + 1;
            let Some(horse) = self.horses.get_mut(crossing.index) else {
                continue;
            };
            horse.finished = true;
            horse.finish_time = Some(crossing.time);
            horse.finish_position = Some(position);
            self.finish_order.push(RaceResult {
                horse_id: horse.id,
                number: horse.number,
                style: horse.stats.style,
                finish_time: crossing.time,
                position,
            });
            log::info!(
                "#{}: horse {} ({}) - {}",
                position,
                horse.number,
                horse.stats.style,
                format_time(crossing.time)
            );
        }
    }

    /// Results so far, first place first
    pub fn finish_order(&self) -> &[RaceResult] {
        &self.finish_order
    }

    /// Roster in gate order
    pub fn horses(&self) -> &[HorseState] {
        &self.horses
    }

    /// Get horse by ID
    pub fn horse(&self, id: u32) -> Option<&HorseState> {
        self.horses.iter().find(|h| h.id == id)
    }

    /// Seed the roster and per-tick rolls were drawn from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Finishers in finish order, then the rest by distance covered.
    pub fn standings(&self) -> Vec<&HorseState> {
        let mut order: Vec<&HorseState> = self.horses.iter().collect();
        order.sort_by(|a, b| match (a.finish_position, b.finish_position) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.race_distance.total_cmp(&a.race_distance),
        });
        order
    }

    /// Get current leader
    pub fn leader(&self) -> Option<&HorseState> {
        self.standings().into_iter().next()
    }

    /// Checkpoints passed plus the fraction toward the next one.
    pub fn continuous_progress(&self, id: u32) -> Option<f64> {
        self.horse(id).map(|h| {
            self.checkpoints
                .continuous_progress(h.current_checkpoint, h.total_progress, h.position)
        })
    }

    /// Compact snapshot for renderers
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            status: self.status,
            elapsed_time: self.elapsed_time,
            horses: self.horses.iter().map(HorseState::snapshot).collect(),
            finisher_count: self.finish_order.len() as u32,
            leader: self.leader().map(|h| h.id),
        }
    }
}

/// Compact race snapshot for IPC transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    pub elapsed_time: f64,
    pub horses: Vec<HorseSnapshot>,
    pub finisher_count: u32,
    pub leader: Option<u32>,
}

impl RaceSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Earliest crossing first, then whoever is further along, then roster id.
fn order_crossings(crossings: &mut [Crossing]) {
    crossings.sort_by(|a, b| {
        a.time
            .total_cmp(&b.time)
            .then_with(|| b.race_distance.total_cmp(&a.race_distance))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// `mm:ss.cc`
pub fn format_time(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    format!("{:02}:{:02}.{:02}", centis / 6000, centis / 100 % 60, centis % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_sim::vector::Vec2;

    fn config(roster_size: usize) -> RaceConfig {
        RaceConfig {
            roster_size,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn new_race_lines_up_the_roster() {
        let race = Race::new(config(6)).unwrap();
        assert_eq!(race.horses().len(), 6);
        assert_eq!(race.status, RaceStatus::NotStarted);
        assert_eq!(race.seed(), 42);
        for horse in race.horses() {
            assert!(!horse.running);
            assert_eq!(horse.position.x, race.track.start_line_x);
            assert!(horse.race_distance.abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Race::new(RaceConfig {
            laps: 0,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::NoLaps);
    }

    #[test]
    fn tick_is_a_no_op_before_start() {
        let mut race = Race::new(config(3)).unwrap();
        let before = race.horses().to_vec();
        race.tick(1.0 / 60.0);
        assert_eq!(race.horses(), &before[..]);
        assert_eq!(race.elapsed_time, 0.0);
    }

    #[test]
    fn time_scale_applies_before_the_clamp() {
        let mut race = Race::new(RaceConfig {
            time_scale: 2.0,
            ..config(2)
        })
        .unwrap();
        race.start();
        race.tick(0.01);
        assert!((race.elapsed_time - 0.02).abs() < 1e-12);
        race.tick(1.0);
        assert!((race.elapsed_time - 0.12).abs() < 1e-12);
        race.tick(-1.0);
        race.tick(f64::NAN);
        assert!((race.elapsed_time - 0.12).abs() < 1e-12);
    }

    fn one_lap_race_near_the_line(x0: f64, x1: f64) -> Race {
        let mut race = Race::new(RaceConfig {
            laps: 1,
            max_dt: 0.2,
            ..config(2)
        })
        .unwrap();
        let top = race.track.finish_point().y;
        assert!(race.place(0, SpawnPoint { position: Vec2::new(x0, top - 40.0), angle: 180.0 }));
        assert!(race.place(1, SpawnPoint { position: Vec2::new(x1, top + 40.0), angle: 180.0 }));
        assert!(!race.place(7, SpawnPoint { position: Vec2::ZERO, angle: 0.0 }));
        race
    }

    #[test]
    fn same_tick_finishers_are_placed_by_crossing_time() {
        // Horse 0 is 26 units further back but processed first.
        let mut race = one_lap_race_near_the_line(1028.0, 1002.0);
        race.start();
        for horse in &mut race.horses {
            horse.velocity = horse.stats.max_velocity;
        }
        race.tick(0.2);

        let order = race.finish_order();
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].horse_id, 1);
        assert_eq!(order[0].position, 1);
        assert_eq!(order[1].horse_id, 0);
        assert_eq!(order[1].position, 2);
        assert!(order[0].finish_time < order[1].finish_time);
        assert!(order[1].finish_time <= 0.2);
        assert_eq!(race.horse(1).and_then(|h| h.finish_position), Some(1));
        assert_eq!(race.status, RaceStatus::Finished);
        assert_eq!(race.leader().map(|h| h.id), Some(1));
    }

    #[test]
    fn standing_short_of_the_line_is_not_a_finish() {
        let mut race = one_lap_race_near_the_line(1010.0, 1020.0);
        race.start();
        race.tick(1.0 / 60.0);
        assert!(race.finish_order().is_empty());
        assert_eq!(race.status, RaceStatus::Racing);
    }

    #[test]
    fn crossings_are_ordered_by_time_then_distance() {
        let at = |index: usize, time: f64, race_distance: f64| Crossing {
            index,
            id: index as u32,
            time,
            race_distance,
        };
        let mut crossings = vec![at(0, 0.30, 2600.0), at(1, 0.25, 2590.0), at(2, 0.30, 2610.0)];
        order_crossings(&mut crossings);
        let ids: Vec<u32> = crossings.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn standings_rank_unfinished_horses_by_distance() {
        let mut race = Race::new(config(3)).unwrap();
        let bottom = race.track.start_point().y;
        race.place(2, SpawnPoint { position: Vec2::new(1600.0, bottom), angle: 0.0 });
        race.place(0, SpawnPoint { position: Vec2::new(1500.0, bottom - 60.0), angle: 0.0 });
        let ids: Vec<u32> = race.standings().iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 0, 1]);
        assert_eq!(race.snapshot().leader, Some(2));
    }

    #[test]
    fn continuous_progress_starts_at_zero() {
        let race = Race::new(config(2)).unwrap();
        let progress = race.continuous_progress(0).unwrap();
        assert!(progress < 0.1);
        assert_eq!(race.continuous_progress(9), None);
    }

    #[test]
    fn snapshot_renders_to_json() {
        let mut race = Race::new(config(2)).unwrap();
        race.start();
        race.tick(1.0 / 60.0);
        let json = race.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "Racing");
        assert_eq!(value["horses"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn finish_times_format_as_minutes_seconds_hundredths() {
        assert_eq!(format_time(83.456), "01:23.46");
        assert_eq!(format_time(5.0), "00:05.00");
    }
}
