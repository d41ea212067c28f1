//! Kinetics - Stamina, speed and movement
//!
//! Runs after `Steering::think` for each horse. Reads only the horse's own
//! state and the perception snapshot taken at the start of the tick.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::race_sim::checkpoint::CheckpointRing;
use crate::race_sim::horse::{HorseState, MAX_STAMINA};
use crate::race_sim::perception::Perception;
use crate::race_sim::stats::EarlyPace;
use crate::race_sim::track::TrackGeometry;
use crate::race_sim::vector::Vec2;

/// Distances that define one race on a track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Track distance of the start line
    pub start_distance: f64,
    /// Track distance of the finish line
    pub finish_distance: f64,
    /// Distance from the start line to the final finish crossing
    pub race_length: f64,
    pub lap_length: f64,
    pub finish_line_x: f64,
    pub center_y: f64,
}

impl Course {
    pub fn new(track: &TrackGeometry, laps: u32) -> Self {
        let lap_length = track.total_length();
        let start_distance = track.track_distance(track.start_point(), 0);
        let finish_distance = track.track_distance(track.finish_point(), 0);
        let first_leg = (finish_distance - start_distance).rem_euclid(lap_length);

        Self {
            start_distance,
            finish_distance,
            race_length: first_leg + f64::from(laps.saturating_sub(1)) * lap_length,
            lap_length,
            finish_line_x: track.finish_line_x,
            center_y: track.center.y,
        }
    }

    /// Fraction of the last step at which the horse reached the finish.
    ///
    /// The line counts when it was crossed moving in the race direction on
    /// the top half with less than a quarter lap left. Horses that somehow
    /// skip the line are caught once they run `tolerance` past the race
    /// length, at the end of the step.
    pub fn finish_crossing(&self, horse: &HorseState, tolerance: f64) -> Option<f64> {
        let remaining = self.race_length - horse.race_distance;
        let from = horse.previous_position.x;
        let to = horse.position.x;
        let crossed = from > self.finish_line_x
            && to <= self.finish_line_x
            && horse.position.y < self.center_y
            && remaining <= self.lap_length * 0.25;

        if crossed {
            Some(((from - self.finish_line_x) / (from - to)).clamp(0.0, 1.0))
        } else if remaining < -tolerance {
            Some(1.0)
        } else {
            None
        }
    }
}

/// Stamina, velocity and movement logic
pub struct Kinetics;

impl Kinetics {
    const STAMINA_DRAIN_SCALE: f64 = 3.0;
    const RECOVERY_SCALE: f64 = 5.0;
    const RECOVERY_DANGER: f64 = 0.2;
    const GUTS_DRAIN: f64 = 1.5;

    const GATE_DELAY: f64 = 2.0;
    const CORNER_EXIT_TIME: f64 = 0.5;
    const CRUISE_ACCEL: f64 = 0.4;
    const COOLDOWN_FACTOR: f64 = 0.5;
    const REPOSITIONING_BONUS: f64 = 1.08;

    const SEPARATION_FACTOR: f64 = 0.35;
    const PUSHBACK: f64 = 1.5;
    const RECOVERY_BLEND: f64 = 0.1;
    const LANE_MARGIN: f64 = 5.0;

    /// Sprint zone and corner exit flags for this tick.
    pub fn sense_track(horse: &mut HorseState, track: &TrackGeometry) {
        horse.in_sprint_zone = track.in_sprint_zone(horse.position);
        let in_curve = track.section_at(horse.position).kind.is_curve();
        if horse.in_curve && !in_curve {
            horse.corner_exit_timer = Self::CORNER_EXIT_TIME;
        }
        horse.in_curve = in_curve;
    }

    pub fn update_stamina<R: Rng + ?Sized>(horse: &mut HorseState, dt: f64, rng: &mut R) {
        if !horse.running {
            return;
        }

        let stats = &horse.stats;
        let velocity_factor = horse.velocity / stats.base_velocity;
        let spike = rng.gen_range(0.85..1.15);
        let early_pace = match stats.profile().early_pace {
            Some(pace) if horse.race_time < EarlyPace::WINDOW => {
                pace.base + rng.gen::<f64>() * pace.spread
            }
            _ => 1.0,
        };
        let drain = stats.stamina_drain_rate
            * velocity_factor
            * stats.skills.stamina_efficiency
            * dt
            * Self::STAMINA_DRAIN_SCALE
            * spike
            * early_pace;

        if horse.stamina > 0.0 {
            horse.stamina = (horse.stamina - drain).max(0.0);
        } else {
            horse.guts_pool = (horse.guts_pool - drain * Self::GUTS_DRAIN).max(0.0);
        }

        if horse.ai.danger_level < Self::RECOVERY_DANGER
            && !horse.in_sprint_zone
            && horse.stamina < MAX_STAMINA
        {
            let recovery = horse.stats.skills.stamina_recovery * dt * Self::RECOVERY_SCALE;
            horse.stamina = (horse.stamina + recovery).min(MAX_STAMINA);
        }

        Self::update_surge(horse);
    }

    /// Latch the late surge. Once set it stays set.
    pub fn update_surge(horse: &mut HorseState) {
        if horse.surge_active {
            return;
        }
        let Some(surge) = horse.stats.profile().surge else {
            return;
        };
        if horse.race_progress > surge.threshold && horse.stamina > surge.min_stamina {
            horse.surge_active = true;
            log::debug!(
                "horse {} ({}) late surge at {:.0}%",
                horse.number,
                horse.stats.style,
                horse.race_progress * 100.0
            );
        }
    }

    pub fn style_modifier(horse: &HorseState) -> f64 {
        match horse.stats.profile().surge {
            Some(surge) if horse.surge_active => surge.modifier(horse.stamina),
            _ => 1.0,
        }
    }

    /// Speed multiplier from remaining stamina. Front runners hit the wall
    /// harder once nearly empty.
    pub fn stamina_factor(horse: &HorseState) -> f64 {
        let effective = if horse.stamina <= 0.0 && horse.guts_pool > 0.0 {
            horse.guts_pool.min(MAX_STAMINA)
        } else {
            horse.stamina
        };

        if effective < 20.0 {
            (0.45 + effective / 100.0) * horse.stats.profile().exhaustion_penalty
        } else if effective < 40.0 {
            0.65 + effective / 100.0 * 0.7
        } else {
            0.75 + effective / 100.0 * 0.25
        }
    }

    pub fn last_spurt(horse: &HorseState) -> f64 {
        if horse.race_progress > 0.9 {
            let spurt = (horse.race_progress - 0.9) / 0.1;
            1.0 + spurt * 0.25 * horse.stats.skills.last_spurt
        } else {
            1.0
        }
    }

    /// Acceleration scale while leaving the gate.
    pub fn gate_delay(horse: &HorseState) -> f64 {
        if horse.race_time >= Self::GATE_DELAY {
            return 1.0;
        }
        let skills = &horse.stats.skills;
        let delay = (Self::GATE_DELAY - horse.race_time) * (2.0 - skills.gate);
        (1.0 - delay * 0.3).max(0.3) * skills.start_dash
    }

    pub fn target_velocity(horse: &HorseState) -> f64 {
        let stats = &horse.stats;
        if horse.finished {
            return stats.base_velocity * Self::COOLDOWN_FACTOR;
        }

        let danger = horse.ai.danger_level / stats.skills.pressure_resistance;
        let mut target = if danger > 0.5 {
            stats.base_velocity * (1.0 - danger * 0.4)
        } else if horse.in_sprint_zone && danger < 0.3 {
            let kick = 1.0 + stats.skills.mid_race_kick * 0.15;
            stats.max_velocity * Self::style_modifier(horse) * stats.skills.top_speed * kick
        } else if danger > 0.2 {
            stats.base_velocity * (1.0 - danger * 0.2)
        } else {
            stats.base_velocity
        };

        if horse.repositioning.active {
            target *= Self::REPOSITIONING_BONUS;
        }
        target *= Self::stamina_factor(horse) * Self::last_spurt(horse);
        target *= 0.95 + stats.skills.focus * 0.05;

        target.clamp(0.0, stats.max_velocity)
    }

    pub fn update_velocity(horse: &mut HorseState, dt: f64) {
        if !horse.running {
            return;
        }

        let stats = &horse.stats;
        let exit_boost = if horse.corner_exit_timer > 0.0 {
            1.0 + stats.skills.corner_exit * 0.5
        } else {
            1.0
        };

        let mut velocity = horse.velocity;
        let target = Self::target_velocity(horse);
        if velocity < target {
            // Full launch acceleration up to cruising speed, gentler above it.
            let launch = if velocity < stats.base_velocity {
                Self::gate_delay(horse)
            } else {
                Self::CRUISE_ACCEL
            };
            let accel = stats.acceleration * stats.skills.acceleration * launch * exit_boost;
            velocity = (velocity + accel * dt).min(target);
        } else if velocity > target {
            let danger = horse.ai.danger_level / stats.skills.pressure_resistance;
            let decel = stats.deceleration * (1.0 + danger * 2.0);
            velocity = (velocity - decel * dt).max(target);
        }

        horse.velocity = velocity.clamp(0.0, stats.max_velocity);
        horse.corner_exit_timer = (horse.corner_exit_timer - dt).max(0.0);
    }

    /// Move along the heading, then resolve overlaps against the snapshot.
    pub fn integrate(
        horse: &mut HorseState,
        view: &Perception,
        track: &TrackGeometry,
        proximity_radius: f64,
        dt: f64,
    ) {
        if !horse.running {
            return;
        }

        let heading = horse.heading();
        let current = horse.position;
        let proposed = current + heading * (horse.velocity * dt);

        let min_separation = proximity_radius * 2.0 * Self::SEPARATION_FACTOR;
        let my_weight = horse.stats.weight();
        let mut pushback = Vec2::ZERO;

        for neighbor in &view.neighbors {
            let other = neighbor.agent.position;
            let distance = proposed.distance(other);
            if distance >= min_separation {
                continue;
            }

            let mut away = (current - other).normalize();
            if away == Vec2::ZERO {
                // Coincident: split along the heading normal by id.
                away = if horse.id < neighbor.agent.id {
                    heading.perpendicular()
                } else {
                    -heading.perpendicular()
                };
            }

            let other_weight = neighbor.agent.power_level / 100.0;
            let total_weight = my_weight + other_weight;
            let ratio = if total_weight > 0.0 {
                1.0 - my_weight / total_weight
            } else {
                0.5
            };
            pushback += away * ((min_separation - distance) * ratio * Self::PUSHBACK);
        }

        let mut next = proposed + pushback;
        if !track.is_on_track(next) {
            let inside = track.nearest_in_lane(next, Self::LANE_MARGIN);
            next = next.lerp(inside, Self::RECOVERY_BLEND);
        }

        if !next.is_finite() {
            log::warn!(
                "horse {} produced non-finite position, restoring ({:.1}, {:.1})",
                horse.number,
                current.x,
                current.y
            );
            next = current;
            if !horse.velocity.is_finite() {
                horse.velocity = 0.0;
            }
            if !horse.steer_angle.is_finite() {
                horse.steer_angle = track.target_angle(current);
                horse.target_angle = horse.steer_angle;
            }
        }

        horse.distance_traveled += next.distance(current);
        horse.previous_position = current;
        horse.position = next;
    }

    /// Capture the next checkpoint in the ring, never skipping ahead.
    pub fn update_checkpoint(horse: &mut HorseState, ring: &CheckpointRing) {
        if !horse.running || ring.is_empty() {
            return;
        }

        let next = ring.next_index(horse.current_checkpoint);
        let captured = ring
            .get(next)
            .map_or(false, |checkpoint| checkpoint.captures(horse.position));
        if captured {
            horse.current_checkpoint = next;
            horse.total_progress += 1;
            if next == 0 {
                horse.lap += 1;
            }
        }
    }

    /// Unwrap the raw track distance into race distance and progress.
    pub fn update_distance(horse: &mut HorseState, track: &TrackGeometry, course: &Course) {
        let raw = track.track_distance(horse.position, 0);
        let half_lap = course.lap_length / 2.0;
        let delta = raw - horse.track_distance;
        if delta < -half_lap {
            horse.circuits += 1;
        } else if delta > half_lap {
            horse.circuits -= 1;
        }

        horse.track_distance = raw;
        horse.race_distance =
            raw + f64::from(horse.circuits) * course.lap_length - course.start_distance;
        horse.race_progress = (horse.race_distance / course.race_length).clamp(0.0, 1.0);
    }
}
