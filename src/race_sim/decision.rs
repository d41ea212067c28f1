//! Decision - Steering toward a target heading
//!
//! Each tick starts from the current heading and adds nudges from cornering,
//! the repositioning wave, gap seeking, collision avoidance, vision avoidance,
//! lane rejoining and rail hugging, in that order. The sum is held within
//! `MAX_HEADING_DEVIATION` of the track tangent and the heading eases toward it.
//!
//! Angles grow clockwise on screen, so a positive nudge turns the horse to
//! its right (away from the infield) and a negative nudge turns it left.

use rand::Rng;
use std::f64::consts::PI;

use crate::race_sim::config::RaceConfig;
use crate::race_sim::horse::{HorseState, Repositioning, WitAction};
use crate::race_sim::perception::{cast_ray, Perception, Side};
use crate::race_sim::track::TrackGeometry;
use crate::race_sim::vector::{wrap_degrees, Vec2};

/// Steering logic
pub struct Steering;

impl Steering {
    const STEERING_SMOOTHNESS: f64 = 0.1;
    const WAVE_SMOOTHNESS: f64 = 0.05;
    const WAVE_DAMPED_SMOOTHNESS: f64 = 0.03;
    const WAVE_DAMPING_START: f64 = 0.7;
    const WAVE_MAX_ANGLE: f64 = 6.0;
    const WAVE_CANDIDATES: usize = 5;
    const WAVE_SPREAD: f64 = 30.0;
    const WAVE_RAY_STEP: f64 = 10.0;

    const GATE_COOLDOWN: f64 = 4.0;
    const REPOSITIONING_BOOST: f64 = 1.5;

    const OBSTACLE_DANGER: f64 = 100.0;
    const OBSTACLE_REACTION: f64 = 80.0;
    const PROBE_ANGLE: f64 = 20.0;
    const PROBE_RANGE: f64 = 150.0;

    const REJOIN_LOOKAHEAD: f64 = 60.0;
    const REJOIN_GAIN: f64 = 0.5;
    /// Largest target offset from the track tangent, degrees
    pub const MAX_HEADING_DEVIATION: f64 = 60.0;

    const RAIL_PREFERRED: f64 = 40.0;
    const RAIL_DEAD_BAND: f64 = 15.0;
    const RAIL_NUDGE: f64 = 2.0;

    /// Decide this tick's heading.
    pub fn think<R: Rng + ?Sized>(
        horse: &mut HorseState,
        view: &Perception,
        track: &TrackGeometry,
        config: &RaceConfig,
        rng: &mut R,
    ) {
        horse.ai.neighbor_count = view.neighbors.len();
        horse.ai.ahead_count = view.ahead.len();
        horse.ai.vision.clone_from(&view.rays);

        if !horse.running || horse.race_time < config.grace_period {
            return;
        }

        horse.ai.danger_level = 0.0;
        horse.target_angle = horse.steer_angle;

        let gate = Self::gate_cooldown(horse.race_time);
        let boost = if horse.repositioning.active {
            Self::REPOSITIONING_BOOST
        } else {
            1.0
        };

        Self::corner(horse, track);
        Self::reposition(horse, view, track, rng);
        Self::seek_gap(horse, view, boost);
        Self::avoid_collisions(horse, view, config.perception.proximity_radius, gate, boost);
        Self::avoid_obstacles(horse, view, track, config, gate);
        Self::rejoin(horse, track);
        if config.rail_hugging {
            Self::hug_rail(horse);
        }
        Self::hold_race_direction(horse, track);

        let smoothness = Self::smoothness(horse);
        horse.steer_angle += (horse.target_angle - horse.steer_angle) * smoothness;

        let wrapped = wrap_degrees(horse.steer_angle);
        horse.target_angle += wrapped - horse.steer_angle;
        horse.steer_angle = wrapped;
    }

    /// Scales avoidance steering while the field leaves the gate.
    pub fn gate_cooldown(race_time: f64) -> f64 {
        if race_time < Self::GATE_COOLDOWN {
            0.1 + race_time / Self::GATE_COOLDOWN * 0.9
        } else {
            1.0
        }
    }

    fn smoothness(horse: &HorseState) -> f64 {
        let wave = &horse.repositioning;
        if !wave.active {
            Self::STEERING_SMOOTHNESS
        } else if wave.progress() > Self::WAVE_DAMPING_START {
            Self::WAVE_DAMPED_SMOOTHNESS
        } else {
            Self::WAVE_SMOOTHNESS
        }
    }

    fn steer_away(horse: &mut HorseState, side: Side, amount: f64) {
        match side {
            Side::Right => horse.target_angle -= amount,
            Side::Left => horse.target_angle += amount,
        }
    }

    fn corner(horse: &mut HorseState, track: &TrackGeometry) {
        horse.ai.distance_to_inner_rail = track.distance_to_inner_rail(horse.position);

        if !track.section_at(horse.position).kind.is_curve() {
            horse.ai.centrifugal_force = 0.0;
            return;
        }

        let desired = track.target_angle(horse.position);
        let diff = wrap_degrees(desired - horse.steer_angle);
        let speed_factor = horse.velocity / horse.stats.base_velocity;
        let force = speed_factor * 3.0 * horse.stats.skills.corner * 1.5;

        horse.ai.centrifugal_force = diff.abs() * 0.1;
        horse.target_angle += diff * force * 0.05;
    }

    /// Eased 0 -> 1 -> 0 heading offset, applied as the change since last tick.
    fn reposition<R: Rng + ?Sized>(
        horse: &mut HorseState,
        view: &Perception,
        track: &TrackGeometry,
        rng: &mut R,
    ) {
        if !horse.repositioning.active {
            horse.repositioning.direction = None;
            horse.repositioning.last_offset = 0.0;
            return;
        }

        let direction = match horse.repositioning.direction {
            Some(direction) => direction,
            None => {
                let direction = Self::choose_wave_direction(horse, track, rng);
                log::debug!(
                    "horse {} repositioning wave, direction {:.2}",
                    horse.number,
                    direction
                );
                horse.repositioning.direction = Some(direction);
                direction
            }
        };

        let progress = horse.repositioning.progress();
        let eased = smoothstep(smoothstep(progress));
        let mut intensity = (eased * PI).sin();
        if progress > Self::WAVE_DAMPING_START {
            let damping = (progress - Self::WAVE_DAMPING_START) / (1.0 - Self::WAVE_DAMPING_START);
            intensity *= 1.0 - damping * damping;
        }

        let clearance = view.center_clearance();
        let vision_safety = if clearance < 60.0 { clearance / 60.0 } else { 1.0 };
        let max_angle = Self::WAVE_MAX_ANGLE * horse.stats.skills.positioning_iq * vision_safety;
        let offset = max_angle * intensity * direction;

        let smoothness = Self::smoothness(horse);
        horse.target_angle += (offset - horse.repositioning.last_offset) / smoothness;
        horse.repositioning.last_offset = offset;
    }

    /// Random clear heading offset, as a fraction of the maximum spread.
    fn choose_wave_direction<R: Rng + ?Sized>(
        horse: &HorseState,
        track: &TrackGeometry,
        rng: &mut R,
    ) -> f64 {
        let reach = (300.0 + horse.stats.skills.positioning_iq * 800.0).min(1500.0);
        let valid: Vec<f64> = (0..Self::WAVE_CANDIDATES)
            .map(|_| (rng.gen::<f64>() - 0.5) * Self::WAVE_SPREAD)
            .filter(|offset| {
                cast_ray(
                    track,
                    horse.position,
                    horse.steer_angle + offset,
                    Self::WAVE_RAY_STEP,
                    Self::WAVE_RAY_STEP,
                    reach,
                ) >= reach
            })
            .collect();

        if valid.is_empty() {
            0.0
        } else {
            valid[rng.gen_range(0..valid.len())] / (Self::WAVE_SPREAD / 2.0)
        }
    }

    fn seek_gap(horse: &mut HorseState, view: &Perception, boost: f64) {
        horse.ai.wit_action = WitAction::Idle;
        let Some(closest) = view.closest_ahead() else {
            return;
        };

        let skills = horse.stats.skills;
        let wit_danger = (1.0 - closest.distance / 100.0).max(0.0);
        horse.ai.danger_level = horse
            .ai
            .danger_level
            .max(wit_danger * 0.3 * (1.0 - horse.stats.power * 0.5));

        let left = view.ahead_on(Side::Left);
        let right = view.ahead_on(Side::Right);
        let threshold = (2.0 - skills.gap_sense).max(0.0);
        let gap_steer = 5.0 * skills.positioning_iq * boost;

        if left as f64 > right as f64 + threshold {
            horse.target_angle += gap_steer;
            horse.ai.wit_action = WitAction::GapRight { left, right };
        } else if right as f64 > left as f64 + threshold {
            horse.target_angle -= gap_steer;
            horse.ai.wit_action = WitAction::GapLeft { left, right };
        }

        let pass_distance = 80.0 * skills.gap_sense * boost;
        if closest.distance < pass_distance {
            let pass_steer = 3.0 * skills.positioning_iq * boost;
            let number = closest.agent.number;
            Self::steer_away(horse, closest.side, pass_steer);
            horse.ai.wit_action = match closest.side {
                Side::Left => WitAction::PassRight { number },
                Side::Right => WitAction::PassLeft { number },
            };
        }
    }

    fn avoid_collisions(
        horse: &mut HorseState,
        view: &Perception,
        proximity_radius: f64,
        gate: f64,
        boost: f64,
    ) {
        let heading = horse.heading();
        let threshold = proximity_radius * 0.8;
        let power = horse.stats.power;
        let aggression = horse.stats.aggression;
        let skills = horse.stats.skills;

        for neighbor in &view.neighbors {
            let distance = neighbor.distance;
            let dot = heading.dot(neighbor.direction);
            let side = Side::of(heading, neighbor.direction);
            let speed_diff = horse.velocity - neighbor.agent.velocity;
            let power_diff = f64::from(horse.stats.power_level) - neighbor.agent.power_level;

            if dot > 0.5 {
                if distance < threshold {
                    let danger = (1.0 - distance / threshold) * 0.7 * (1.0 - power * 0.4);
                    horse.ai.danger_level = horse.ai.danger_level.max(danger / skills.pack_racing);
                }

                let band = if distance < threshold * 0.5 {
                    (if speed_diff > 5.0 { 8.0 } else { 6.0 }) * (1.0 - power * 0.3)
                } else if distance < threshold * 0.75 {
                    (if speed_diff > 5.0 { 5.0 } else { 3.0 }) * (1.0 - power * 0.4)
                } else if distance < threshold {
                    2.0 * (1.0 - power * 0.6)
                } else {
                    0.0
                };
                if band > 0.0 {
                    Self::steer_away(horse, side, band * gate * skills.lane_change * boost);
                }
            } else if dot < -0.3 && speed_diff < -5.0 && distance < threshold * 0.9 {
                // Faster horse closing from behind: yield or hold the line.
                let dominance = (power_diff * 0.4 + speed_diff * 1.5 - 15.0) * aggression;
                if dominance < 0.0 {
                    Self::steer_away(horse, side, 6.0 * (1.0 - aggression) * gate);
                } else {
                    Self::steer_away(horse, side, -3.0 * aggression * gate * 0.5);
                }
            } else if dot.abs() < 0.3 && distance < threshold * 0.6 {
                let dominance = (power_diff * 0.5 + speed_diff) * aggression;
                let amount = if dominance < -10.0 {
                    6.0 * (1.0 - aggression) * gate
                } else if dominance > 10.0 {
                    2.0 * aggression * gate
                } else {
                    4.0 * (1.0 - 0.3 * power) * gate
                };
                Self::steer_away(horse, side, amount);
            }
        }
    }

    fn avoid_obstacles(
        horse: &mut HorseState,
        view: &Perception,
        track: &TrackGeometry,
        config: &RaceConfig,
        gate: f64,
    ) {
        if view.rays.is_empty() {
            return;
        }

        let clearance = view.center_clearance();
        if clearance < Self::OBSTACLE_DANGER {
            let danger = (1.0 - clearance / Self::OBSTACLE_DANGER) * 0.8 * (1.0 - horse.stats.power * 0.3);
            horse.ai.danger_level = horse.ai.danger_level.max(danger);
        }
        if clearance >= Self::OBSTACLE_REACTION {
            return;
        }

        let probe = |delta: f64| {
            cast_ray(
                track,
                view.origin,
                horse.steer_angle + delta,
                config.perception.ray_start,
                config.perception.ray_step,
                Self::PROBE_RANGE,
            )
        };
        let left = probe(-Self::PROBE_ANGLE);
        let right = probe(Self::PROBE_ANGLE);
        let urgency = (1.0 - clearance / Self::OBSTACLE_REACTION).max(0.0);

        let hard = (3.0 + urgency * 5.0) * gate;
        let soft = (2.0 + urgency * 3.0) * gate;
        horse.target_angle += if left > right + 10.0 {
            -hard
        } else if right > left + 10.0 {
            hard
        } else if right > left {
            soft
        } else if left > right {
            -soft
        } else if Self::tangent_error(horse, track) < 0.0 {
            // Equal clearance both ways: fall back toward the race direction.
            -soft
        } else {
            soft
        };
    }

    /// Signed turn from the heading to the track tangent, degrees.
    fn tangent_error(horse: &HorseState, track: &TrackGeometry) -> f64 {
        wrap_degrees(track.target_angle(horse.position) - horse.steer_angle)
    }

    /// Off the surface: aim at a lane point a little ahead.
    fn rejoin(horse: &mut HorseState, track: &TrackGeometry) {
        if track.is_on_track(horse.position) {
            return;
        }
        let margin = track.config.lane_width / 4.0;
        let tangent = Vec2::from_degrees(track.target_angle(horse.position));
        let aim = track.nearest_in_lane(horse.position, margin) + tangent * Self::REJOIN_LOOKAHEAD;
        let desired = (aim - horse.position).degrees();
        horse.target_angle += wrap_degrees(desired - horse.steer_angle) * Self::REJOIN_GAIN;
    }

    fn hold_race_direction(horse: &mut HorseState, track: &TrackGeometry) {
        let tangent = horse.steer_angle + Self::tangent_error(horse, track);
        let deviation = (horse.target_angle - tangent)
            .clamp(-Self::MAX_HEADING_DEVIATION, Self::MAX_HEADING_DEVIATION);
        horse.target_angle = tangent + deviation;
    }

    fn hug_rail(horse: &mut HorseState) {
        let Some(rail) = horse.ai.distance_to_inner_rail else {
            return;
        };
        let error = rail - Self::RAIL_PREFERRED;
        if error.abs() > Self::RAIL_DEAD_BAND {
            horse.target_angle += if error > 0.0 {
                -Self::RAIL_NUDGE
            } else {
                Self::RAIL_NUDGE
            };
        }
    }

    /// Advance the wave timer or the cooldown until the next trigger roll.
    pub fn update_repositioning<R: Rng + ?Sized>(horse: &mut HorseState, dt: f64, rng: &mut R) {
        if !horse.running {
            return;
        }

        let iq = horse.stats.skills.positioning_iq;
        let wave = &mut horse.repositioning;
        if wave.active {
            wave.timer -= dt;
            if wave.timer <= 0.0 {
                wave.active = false;
                wave.timer = 0.0;
                wave.cooldown = Repositioning::rest_cooldown(rng);
            }
        } else {
            wave.cooldown -= dt;
            if wave.cooldown <= 0.0 {
                if rng.gen::<f64>() < 0.5 + iq * 0.1 {
                    wave.active = true;
                    wave.timer = 1.5 + rng.gen::<f64>() * 1.5;
                    wave.duration = wave.timer;
                    wave.direction = None;
                    wave.last_offset = 0.0;
                } else {
                    wave.cooldown = 2.0 + rng.gen::<f64>() * 3.0;
                }
            }
        }
    }
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_sim::config::TrackConfig;
    use crate::race_sim::perception::{AgentSnapshot, AheadView, NeighborView, VisionRay};
    use crate::race_sim::stats::{derive_stats, BaseStats, RunningStyle, SkillSet};
    use crate::race_sim::track::SpawnPoint;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn track() -> TrackGeometry {
        TrackGeometry::new(&TrackConfig::default()).unwrap()
    }

    fn horse_at(x: f64, y: f64, angle: f64) -> HorseState {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let base = BaseStats {
            base_velocity: 180.0,
            max_velocity: 260.0,
            acceleration: 90.0,
            deceleration: 30.0,
            power: 0.8,
            power_level: 80,
            aggression_roll: 0.5,
            skills: SkillSet::NEUTRAL,
        };
        let stats = derive_stats(&base, RunningStyle::Runner);
        let spawn = SpawnPoint {
            position: Vec2::new(x, y),
            angle,
        };
        let mut horse = HorseState::new(0, stats, spawn, &mut rng);
        horse.start_running();
        horse.race_time = 10.0;
        horse.velocity = horse.stats.base_velocity;
        horse.repositioning.cooldown = 100.0;
        horse
    }

    fn clear_view() -> Perception {
        Perception {
            neighbors: Vec::new(),
            ahead: Vec::new(),
            rays: [-30.0, -15.0, 0.0, 15.0, 30.0]
                .iter()
                .map(|&angle| VisionRay {
                    angle,
                    distance: 200.0,
                })
                .collect(),
            origin: Vec2::ZERO,
            range: 200.0,
        }
    }

    fn other(id: u32, x: f64, y: f64) -> AgentSnapshot {
        AgentSnapshot {
            id,
            number: id + 1,
            position: Vec2::new(x, y),
            heading: Vec2::new(1.0, 0.0),
            velocity: 180.0,
            power_level: 80.0,
            running: true,
        }
    }

    fn think(horse: &mut HorseState, view: &Perception) {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        Steering::think(horse, view, &track(), &RaceConfig::default(), &mut rng);
    }

    #[test]
    fn no_steering_during_grace_period() {
        let mut horse = horse_at(90.0, 600.0, 60.0);
        horse.race_time = 0.5;
        think(&mut horse, &clear_view());
        assert_eq!(horse.steer_angle, 60.0);
    }

    #[test]
    fn straight_running_holds_heading() {
        let mut horse = horse_at(1200.0, 900.0, 0.0);
        think(&mut horse, &clear_view());
        assert_eq!(horse.steer_angle, 0.0);
        assert_eq!(horse.ai.danger_level, 0.0);
        assert_eq!(horse.ai.wit_action, WitAction::Idle);
    }

    #[test]
    fn cornering_turns_toward_the_tangent() {
        let mut horse = horse_at(90.0, 600.0, 80.0);
        think(&mut horse, &clear_view());
        assert!(horse.steer_angle > 80.0 && horse.steer_angle < 90.0);
        assert!((horse.ai.centrifugal_force - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gap_seeking_drifts_away_from_the_crowded_side() {
        let mut horse = horse_at(1200.0, 900.0, 0.0);
        let mut view = clear_view();
        view.ahead = (1..=3)
            .map(|id| AheadView {
                agent: other(id, 1310.0, 880.0),
                distance: 120.0,
                side: Side::Left,
            })
            .collect();
        think(&mut horse, &view);
        assert_eq!(horse.ai.wit_action, WitAction::GapRight { left: 3, right: 0 });
        assert!(horse.steer_angle > 0.0);
    }

    #[test]
    fn close_horse_ahead_is_passed_on_the_open_side() {
        let mut horse = horse_at(1200.0, 900.0, 0.0);
        let mut view = clear_view();
        view.ahead.push(AheadView {
            agent: other(4, 1250.0, 910.0),
            distance: 50.0,
            side: Side::Right,
        });
        think(&mut horse, &view);
        assert_eq!(horse.ai.wit_action, WitAction::PassLeft { number: 5 });
        assert!(horse.steer_angle < 0.0);
        assert!(horse.ai.danger_level > 0.0);
    }

    #[test]
    fn horse_close_ahead_raises_danger_and_steers_away() {
        let mut horse = horse_at(1200.0, 900.0, 0.0);
        let mut view = clear_view();
        let direction = Vec2::new(15.0, 3.0).normalize();
        view.neighbors.push(NeighborView {
            agent: other(1, 1215.0, 903.0),
            distance: Vec2::new(15.0, 3.0).length(),
            direction,
        });
        think(&mut horse, &view);
        assert!(horse.ai.danger_level > 0.2);
        assert!(horse.steer_angle < 0.0);
    }

    #[test]
    fn horse_alongside_is_given_room() {
        let mut horse = horse_at(1200.0, 900.0, 0.0);
        let mut view = clear_view();
        view.neighbors.push(NeighborView {
            agent: other(1, 1200.0, 880.0),
            distance: 20.0,
            direction: Vec2::new(0.0, -1.0),
        });
        think(&mut horse, &view);
        // Neighbor on the left, so the horse moves right.
        assert!(horse.steer_angle > 0.0);
    }

    #[test]
    fn blocked_vision_steers_toward_the_clearer_probe() {
        // Hugging the inner edge: the left probe hits the rail at once.
        let mut horse = horse_at(1200.0, 815.0, 0.0);
        let mut view = clear_view();
        view.origin = horse.position;
        view.rays[2].distance = 40.0;
        think(&mut horse, &view);
        assert!(horse.ai.danger_level > 0.3);
        assert!(horse.steer_angle > 0.0);
    }

    #[test]
    fn even_probes_turn_back_toward_the_race_direction() {
        // Angled into the infield from mid-lane: both probes see open track.
        let mut horse = horse_at(1200.0, 900.0, -10.0);
        let mut view = clear_view();
        view.origin = horse.position;
        view.rays[2].distance = 40.0;
        think(&mut horse, &view);
        assert!(horse.steer_angle > -10.0);
    }

    #[test]
    fn off_track_horse_steers_back_onto_the_lane() {
        let mut horse = horse_at(1200.0, 790.0, -30.0);
        think(&mut horse, &clear_view());
        assert!(horse.target_angle > 0.0);
        assert!(horse.steer_angle > -30.0);

        // Beyond the outer rail of the top straight, heading along it.
        let mut horse = horse_at(1200.0, 200.0, 180.0);
        think(&mut horse, &clear_view());
        assert!(horse.steer_angle < 180.0);
    }

    #[test]
    fn target_stays_near_the_track_tangent() {
        let mut horse = horse_at(1200.0, 900.0, 120.0);
        think(&mut horse, &clear_view());
        assert_eq!(horse.target_angle, Steering::MAX_HEADING_DEVIATION);
        assert!(horse.steer_angle < 120.0);

        let mut backwards = horse_at(1200.0, 900.0, 180.0);
        for _ in 0..300 {
            think(&mut backwards, &clear_view());
        }
        assert!(Vec2::from_degrees(backwards.steer_angle).x > 0.45);
    }

    #[test]
    fn heading_is_kept_in_half_open_degrees() {
        let mut horse = horse_at(1200.0, 900.0, 710.0);
        think(&mut horse, &clear_view());
        assert!((horse.steer_angle + 10.0).abs() < 1e-9);
        assert!(horse.target_angle.abs() <= 180.0);
    }

    #[test]
    fn rail_hugging_pulls_toward_the_inner_rail() {
        let mut horse = horse_at(1200.0, 900.0, 0.0);
        let config = RaceConfig {
            rail_hugging: true,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        Steering::think(&mut horse, &clear_view(), &track(), &config, &mut rng);
        assert_eq!(horse.ai.distance_to_inner_rail, Some(90.0));
        assert!((horse.steer_angle + 0.2).abs() < 1e-12);
    }

    #[test]
    fn repositioning_wave_eases_out_and_back() {
        let t = track();
        let config = RaceConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut horse = horse_at(1200.0, 900.0, 0.0);
        horse.repositioning.active = true;
        horse.repositioning.timer = 2.0;
        horse.repositioning.duration = 2.0;
        horse.repositioning.direction = Some(1.0);

        let view = clear_view();
        let dt = 1.0 / 60.0;
        let mut peak: f64 = 0.0;
        let mut previous = horse.steer_angle;
        for _ in 0..150 {
            Steering::think(&mut horse, &view, &t, &config, &mut rng);
            Steering::update_repositioning(&mut horse, dt, &mut rng);
            assert!((horse.steer_angle - previous).abs() < 1.0);
            previous = horse.steer_angle;
            peak = peak.max(horse.steer_angle);
        }
        assert!(!horse.repositioning.active);
        assert!(peak > 4.0);
        assert!(horse.steer_angle.abs() < 0.5);
    }

    #[test]
    fn cooldown_expiry_either_starts_a_wave_or_rearms() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut started = 0;
        for _ in 0..50 {
            let mut horse = horse_at(1200.0, 900.0, 0.0);
            horse.repositioning.cooldown = 0.01;
            Steering::update_repositioning(&mut horse, 0.1, &mut rng);
            let wave = &horse.repositioning;
            if wave.active {
                started += 1;
                assert!((1.5..3.0).contains(&wave.timer));
                assert_eq!(wave.timer, wave.duration);
            } else {
                assert!((2.0..5.0).contains(&wave.cooldown));
            }
        }
        assert!(started > 0 && started < 50);
    }

    #[test]
    fn gate_cooldown_ramps_to_full() {
        assert!((Steering::gate_cooldown(0.0) - 0.1).abs() < 1e-12);
        assert!((Steering::gate_cooldown(2.0) - 0.55).abs() < 1e-12);
        assert_eq!(Steering::gate_cooldown(4.0), 1.0);
    }
}
