//! Horse - Per-competitor state
//!
//! Identity and stats are fixed at creation. Kinematic and AI state is
//! mutated by `Steering` and `Kinetics` once per tick.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::race_sim::perception::VisionRay;
use crate::race_sim::stats::FinalStats;
use crate::race_sim::track::SpawnPoint;
use crate::race_sim::vector::{wrap_degrees, Vec2};

pub const MAX_STAMINA: f64 = 100.0;

/// Coat colors assigned round-robin by horse number
pub const COAT_COLORS: [[u8; 3]; 9] = [
    [139, 69, 19],
    [101, 67, 33],
    [210, 180, 140],
    [139, 115, 85],
    [70, 50, 40],
    [180, 140, 100],
    [255, 255, 255],
    [50, 50, 50],
    [255, 0, 255],
];

/// Last decision made by the gap-seeking layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WitAction {
    #[default]
    Idle,
    /// Field lopsided to the left, drifting right
    GapRight { left: usize, right: usize },
    /// Field lopsided to the right, drifting left
    GapLeft { left: usize, right: usize },
    /// Passing the closest horse on its right
    PassRight { number: u32 },
    /// Passing the closest horse on its left
    PassLeft { number: u32 },
}

impl fmt::Display for WitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WitAction::Idle => Ok(()),
            WitAction::GapRight { left, right } => write!(f, "Gap R (L:{left} R:{right})"),
            WitAction::GapLeft { left, right } => write!(f, "Gap L (L:{left} R:{right})"),
            WitAction::PassRight { number } => write!(f, "Pass R (#{number})"),
            WitAction::PassLeft { number } => write!(f, "Pass L (#{number})"),
        }
    }
}

/// Lateral wave maneuver state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repositioning {
    pub active: bool,
    /// Seconds left in the current wave
    pub timer: f64,
    /// Length of the current wave, set when it begins
    pub duration: f64,
    /// Seconds until the next trigger roll
    pub cooldown: f64,
    /// Wave direction in [-1, 1], chosen when the wave begins
    pub direction: Option<f64>,
    /// Heading offset applied last tick
    pub last_offset: f64,
}

impl Repositioning {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            active: false,
            timer: 0.0,
            duration: 0.0,
            cooldown: Self::rest_cooldown(rng),
            direction: None,
            last_offset: 0.0,
        }
    }

    /// Cooldown after a wave ends, also used before the first one.
    pub fn rest_cooldown<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        3.0 + rng.gen::<f64>() * 5.0
    }

    /// 0 when the wave starts, 1 when it ends.
    pub fn progress(&self) -> f64 {
        if !self.active || self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - self.timer / self.duration).clamp(0.0, 1.0)
    }
}

/// Transient decision outputs, exposed for debugging overlays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiState {
    pub danger_level: f64,
    pub wit_action: WitAction,
    pub centrifugal_force: f64,
    pub distance_to_inner_rail: Option<f64>,
    pub vision: Vec<VisionRay>,
    pub neighbor_count: usize,
    pub ahead_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseState {
    /// Index in the roster
    pub id: u32,
    /// Saddle-cloth number, starting at 1
    pub number: u32,
    pub color: [u8; 3],
    pub stats: FinalStats,

    pub position: Vec2,
    pub previous_position: Vec2,
    /// Current heading, degrees
    pub steer_angle: f64,
    /// Heading the decision layer is steering toward
    pub target_angle: f64,
    pub velocity: f64,
    pub stamina: f64,
    /// Secondary stamina drawn once `stamina` hits zero
    pub guts_pool: f64,

    pub lap: u32,
    pub current_checkpoint: usize,
    pub total_progress: u32,

    /// Raw track distance at the end of the last tick
    pub track_distance: f64,
    /// Whole circuits added to the raw distance
    pub circuits: i32,
    /// Unwrapped distance from the start line
    pub race_distance: f64,
    /// Fraction of the race covered, 0 to 1
    pub race_progress: f64,
    /// Odometer, including lateral movement
    pub distance_traveled: f64,

    pub running: bool,
    pub race_time: f64,
    pub finished: bool,
    pub finish_time: Option<f64>,
    pub finish_position: Option<u32>,

    pub in_sprint_zone: bool,
    pub in_curve: bool,
    pub corner_exit_timer: f64,
    pub surge_active: bool,
    pub repositioning: Repositioning,
    pub ai: AiState,
}

impl HorseState {
    pub fn new<R: Rng + ?Sized>(id: u32, stats: FinalStats, spawn: SpawnPoint, rng: &mut R) -> Self {
        let guts_pool = stats.guts_pool();
        Self {
            id,
            number: id + 1,
            color: COAT_COLORS[id as usize % COAT_COLORS.len()],
            stats,
            position: spawn.position,
            previous_position: spawn.position,
            steer_angle: spawn.angle,
            target_angle: spawn.angle,
            velocity: 0.0,
            stamina: MAX_STAMINA,
            guts_pool,
            lap: 0,
            current_checkpoint: 0,
            total_progress: 0,
            track_distance: 0.0,
            circuits: 0,
            race_distance: 0.0,
            race_progress: 0.0,
            distance_traveled: 0.0,
            running: false,
            race_time: 0.0,
            finished: false,
            finish_time: None,
            finish_position: None,
            in_sprint_zone: false,
            in_curve: false,
            corner_exit_timer: 0.0,
            surge_active: false,
            repositioning: Repositioning::new(rng),
            ai: AiState::default(),
        }
    }

    /// Unit vector along the current heading.
    pub fn heading(&self) -> Vec2 {
        Vec2::from_degrees(self.steer_angle)
    }

    /// Move to a gate slot, keeping stats and identity.
    pub fn place(&mut self, spawn: SpawnPoint) {
        self.position = spawn.position;
        self.previous_position = spawn.position;
        self.steer_angle = spawn.angle;
        self.target_angle = spawn.angle;
    }

    pub fn start_running(&mut self) {
        self.running = true;
        self.race_time = 0.0;
    }

    pub fn snapshot(&self) -> HorseSnapshot {
        HorseSnapshot {
            id: self.id,
            number: self.number,
            color: self.color,
            style: self.stats.style.label().to_string(),
            x: self.position.x,
            y: self.position.y,
            heading: wrap_degrees(self.steer_angle),
            velocity: self.velocity,
            stamina: self.stamina,
            lap: self.lap,
            total_progress: self.total_progress,
            race_progress: self.race_progress,
            danger_level: self.ai.danger_level,
            wit_action: self.ai.wit_action.to_string(),
            vision: self.ai.vision.clone(),
            repositioning: self.repositioning.active,
            surge: self.surge_active,
            finished: self.finished,
            finish_position: self.finish_position,
        }
    }
}

/// Read-only view of a horse for renderers and leaderboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorseSnapshot {
    pub id: u32,
    pub number: u32,
    pub color: [u8; 3],
    pub style: String,
    pub x: f64,
    pub y: f64,
    /// Degrees in (-180, 180]
    pub heading: f64,
    pub velocity: f64,
    pub stamina: f64,
    pub lap: u32,
    pub total_progress: u32,
    pub race_progress: f64,
    pub danger_level: f64,
    pub wit_action: String,
    pub vision: Vec<VisionRay>,
    pub repositioning: bool,
    pub surge: bool,
    pub finished: bool,
    pub finish_position: Option<u32>,
}
