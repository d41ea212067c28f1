//! Perception - What each horse sees at the start of a tick
//!
//! Built from one `AgentSnapshot` per horse, taken before anyone moves, so
//! iteration order never leaks updated positions to later horses.

use serde::{Deserialize, Serialize};

use crate::race_sim::config::PerceptionConfig;
use crate::race_sim::horse::HorseState;
use crate::race_sim::track::TrackGeometry;
use crate::race_sim::vector::Vec2;

/// Frozen view of one horse for the perception phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: u32,
    pub number: u32,
    pub position: Vec2,
    pub heading: Vec2,
    pub velocity: f64,
    pub power_level: f64,
    pub running: bool,
}

impl From<&HorseState> for AgentSnapshot {
    fn from(horse: &HorseState) -> Self {
        Self {
            id: horse.id,
            number: horse.number,
            position: horse.position,
            heading: horse.heading(),
            velocity: horse.velocity,
            power_level: f64::from(horse.stats.power_level),
            running: horse.running,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Right when `direction` lies clockwise of `heading` on screen.
    pub fn of(heading: Vec2, direction: Vec2) -> Self {
        if heading.cross(direction) > 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    }
}

/// Another horse inside the proximity radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborView {
    pub agent: AgentSnapshot,
    pub distance: f64,
    /// Unit direction from the observer to the neighbor
    pub direction: Vec2,
}

/// Another horse near the observer's lookahead point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AheadView {
    pub agent: AgentSnapshot,
    pub distance: f64,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionRay {
    /// Offset from the heading, degrees
    pub angle: f64,
    /// Distance to the first blocked sample, or the full range
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perception {
    pub neighbors: Vec<NeighborView>,
    pub ahead: Vec<AheadView>,
    pub rays: Vec<VisionRay>,
    /// Where the rays were cast from: the horse itself, or the closest lane
    /// point when it has strayed off the surface
    pub origin: Vec2,
    pub range: f64,
}

impl Perception {
    /// Rays within this offset count toward center clearance.
    pub const CENTER_CONE: f64 = 15.0;
    /// Inset of the ray origin for horses off the surface
    pub const ORIGIN_MARGIN: f64 = 5.0;

    pub fn observe(
        me: &AgentSnapshot,
        field: &[AgentSnapshot],
        track: &TrackGeometry,
        config: &PerceptionConfig,
    ) -> Self {
        let lookahead = me.position + me.heading * config.wit_level;
        let mut neighbors = Vec::new();
        let mut ahead = Vec::new();

        for other in field.iter().filter(|other| other.id != me.id) {
            let offset = other.position - me.position;
            let distance = offset.length();
            let direction = offset.normalize();

            if distance < config.proximity_radius {
                neighbors.push(NeighborView {
                    agent: *other,
                    distance,
                    direction,
                });
            }

            if other.running
                && me.heading.dot(direction) > 0.3
                && other.position.distance(lookahead) < config.wit_radius
            {
                ahead.push(AheadView {
                    agent: *other,
                    distance,
                    side: Side::of(me.heading, direction),
                });
            }
        }

        let origin = if track.is_on_track(me.position) {
            me.position
        } else {
            track.nearest_in_lane(me.position, Self::ORIGIN_MARGIN)
        };
        let base_angle = me.heading.degrees();
        let rays = config
            .vision_angles
            .iter()
            .map(|&angle| VisionRay {
                angle,
                distance: cast_ray(
                    track,
                    origin,
                    base_angle + angle,
                    config.ray_start,
                    config.ray_step,
                    config.vision_length,
                ),
            })
            .collect();

        Self {
            neighbors,
            ahead,
            rays,
            origin,
            range: config.vision_length,
        }
    }

    /// Narrowest clearance among the forward rays.
    pub fn center_clearance(&self) -> f64 {
        self.rays
            .iter()
            .filter(|ray| ray.angle.abs() <= Self::CENTER_CONE)
            .map(|ray| ray.distance)
            .fold(None, |min: Option<f64>, d| Some(min.map_or(d, |m| m.min(d))))
            .unwrap_or(self.range)
    }

    pub fn closest_ahead(&self) -> Option<&AheadView> {
        self.ahead
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    pub fn ahead_on(&self, side: Side) -> usize {
        self.ahead.iter().filter(|view| view.side == side).count()
    }
}

/// March from `origin` along `angle` until a sample is blocked. Returns the
/// distance of the first blocked sample, or `max` if none was hit.
pub fn cast_ray(
    track: &TrackGeometry,
    origin: Vec2,
    angle: f64,
    start: f64,
    step: f64,
    max: f64,
) -> f64 {
    let direction = Vec2::from_degrees(angle);
    let mut distance = start;
    while distance < max {
        if track.is_blocked(origin + direction * distance) {
            return distance;
        }
        distance += step;
    }
    max
}
