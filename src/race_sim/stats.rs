//! Stats - Running styles and skill derivation
//!
//! A horse rolls a set of base stats once, then `derive_stats` applies its
//! running style's multiplier table and clamps every skill. The result is
//! immutable for the rest of the race.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Running style archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunningStyle {
    /// Front runner: fast out of the gate, fades hard
    Runner,
    /// Sits just behind the pace
    Leader,
    /// Mid-pack with a late surge
    Stalker,
    /// Back of the field, explosive finish
    Closer,
}

impl RunningStyle {
    pub const ALL: [RunningStyle; 4] = [
        RunningStyle::Runner,
        RunningStyle::Leader,
        RunningStyle::Stalker,
        RunningStyle::Closer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RunningStyle::Runner => "Runner",
            RunningStyle::Leader => "Leader",
            RunningStyle::Stalker => "Stalker",
            RunningStyle::Closer => "Closer",
        }
    }

    pub fn profile(self) -> &'static StyleProfile {
        match self {
            RunningStyle::Runner => &RUNNER,
            RunningStyle::Leader => &LEADER,
            RunningStyle::Stalker => &STALKER,
            RunningStyle::Closer => &CLOSER,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for RunningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scalar skills, all nominally around 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    pub corner: f64,
    pub acceleration: f64,
    pub top_speed: f64,
    pub stamina_efficiency: f64,
    pub gate: f64,
    pub last_spurt: f64,
    pub guts_reserve: f64,
    pub stamina_recovery: f64,
    pub lane_change: f64,
    pub gap_sense: f64,
    pub positioning_iq: f64,
    pub start_dash: f64,
    pub corner_exit: f64,
    pub mid_race_kick: f64,
    pub focus: f64,
    pub pressure_resistance: f64,
    pub pack_racing: f64,
}

impl SkillSet {
    pub const NEUTRAL: SkillSet = SkillSet {
        corner: 1.0,
        acceleration: 1.0,
        top_speed: 1.0,
        stamina_efficiency: 1.0,
        gate: 1.0,
        last_spurt: 1.0,
        guts_reserve: 1.0,
        stamina_recovery: 1.0,
        lane_change: 1.0,
        gap_sense: 1.0,
        positioning_iq: 1.0,
        start_dash: 1.0,
        corner_exit: 1.0,
        mid_race_kick: 1.0,
        focus: 1.0,
        pressure_resistance: 1.0,
        pack_racing: 1.0,
    };

    /// Lower clamp bound for each derived skill
    pub const MIN: SkillSet = SkillSet {
        corner: 0.0,
        acceleration: 0.0,
        top_speed: 0.0,
        stamina_efficiency: 0.7,
        gate: 0.0,
        last_spurt: 0.6,
        guts_reserve: 0.5,
        stamina_recovery: 0.7,
        lane_change: 0.7,
        gap_sense: 0.7,
        positioning_iq: 0.7,
        start_dash: 0.6,
        corner_exit: 0.7,
        mid_race_kick: 0.6,
        focus: 0.7,
        pressure_resistance: 0.6,
        pack_racing: 0.7,
    };

    /// Upper clamp bound for each derived skill
    pub const MAX: SkillSet = SkillSet {
        corner: 1.5,
        acceleration: 1.5,
        top_speed: 1.5,
        stamina_efficiency: 1.2,
        gate: 1.5,
        last_spurt: 1.6,
        guts_reserve: 1.7,
        stamina_recovery: 1.5,
        lane_change: 1.5,
        gap_sense: 1.6,
        positioning_iq: 1.6,
        start_dash: 1.6,
        corner_exit: 1.6,
        mid_race_kick: 1.8,
        focus: 1.5,
        pressure_resistance: 1.7,
        pack_racing: 1.6,
    };

    /// Roll every skill independently.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut standard = || rng.gen_range(0.8..1.2);
        let corner = standard();
        let acceleration = standard();
        let top_speed = standard();
        let stamina_efficiency = standard();
        let gate = standard();
        let stamina_recovery = standard();
        let lane_change = standard();
        let gap_sense = standard();
        let positioning_iq = standard();
        let start_dash = standard();
        let corner_exit = standard();
        let focus = standard();
        let pack_racing = standard();

        // Finishing skills get a wider spread.
        let mut wide = || rng.gen_range(0.7..1.3);
        Self {
            corner,
            acceleration,
            top_speed,
            stamina_efficiency,
            gate,
            last_spurt: wide(),
            guts_reserve: wide(),
            stamina_recovery,
            lane_change,
            gap_sense,
            positioning_iq,
            start_dash,
            corner_exit,
            mid_race_kick: wide(),
            focus,
            pressure_resistance: wide(),
            pack_racing,
        }
    }

    /// Field-wise combination with another skill set.
    pub fn zip_with(&self, other: &SkillSet, f: impl Fn(f64, f64) -> f64) -> SkillSet {
        SkillSet {
            corner: f(self.corner, other.corner),
            acceleration: f(self.acceleration, other.acceleration),
            top_speed: f(self.top_speed, other.top_speed),
            stamina_efficiency: f(self.stamina_efficiency, other.stamina_efficiency),
            gate: f(self.gate, other.gate),
            last_spurt: f(self.last_spurt, other.last_spurt),
            guts_reserve: f(self.guts_reserve, other.guts_reserve),
            stamina_recovery: f(self.stamina_recovery, other.stamina_recovery),
            lane_change: f(self.lane_change, other.lane_change),
            gap_sense: f(self.gap_sense, other.gap_sense),
            positioning_iq: f(self.positioning_iq, other.positioning_iq),
            start_dash: f(self.start_dash, other.start_dash),
            corner_exit: f(self.corner_exit, other.corner_exit),
            mid_race_kick: f(self.mid_race_kick, other.mid_race_kick),
            focus: f(self.focus, other.focus),
            pressure_resistance: f(self.pressure_resistance, other.pressure_resistance),
            pack_racing: f(self.pack_racing, other.pack_racing),
        }
    }

    pub fn scaled(&self, multipliers: &SkillSet) -> SkillSet {
        self.zip_with(multipliers, |value, m| value * m)
    }

    pub fn clamped(&self) -> SkillSet {
        self.zip_with(&Self::MIN, f64::max)
            .zip_with(&Self::MAX, f64::min)
    }
}

impl Default for SkillSet {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Late surge latch for back-running styles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surge {
    /// Race progress that arms the surge
    pub threshold: f64,
    /// Stamina required at the moment of latching
    pub min_stamina: f64,
    /// Speed modifier at zero stamina
    pub base_boost: f64,
    /// Extra modifier at full stamina
    pub stamina_boost: f64,
}

impl Surge {
    pub fn modifier(&self, stamina: f64) -> f64 {
        self.base_boost + stamina / 100.0 * self.stamina_boost
    }
}

/// Extra stamina cost for front-running styles early in the race
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarlyPace {
    pub base: f64,
    pub spread: f64,
}

impl EarlyPace {
    /// Race time during which the penalty applies
    pub const WINDOW: f64 = 30.0;
}

/// Per-style tuning table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub base_velocity: f64,
    pub max_velocity: f64,
    pub acceleration: f64,
    pub stamina_drain: f64,
    /// Aggression floor and the span added by the horse's roll
    pub aggression: (f64, f64),
    pub skills: SkillSet,
    pub surge: Option<Surge>,
    pub early_pace: Option<EarlyPace>,
    /// Stamina factor multiplier when nearly empty
    pub exhaustion_penalty: f64,
}

pub const RUNNER: StyleProfile = StyleProfile {
    base_velocity: 1.03,
    max_velocity: 1.03,
    acceleration: 1.1,
    stamina_drain: 1.4,
    aggression: (0.7, 0.3),
    skills: SkillSet {
        acceleration: 1.1,
        gate: 1.15,
        last_spurt: 0.85,
        guts_reserve: 0.8,
        stamina_recovery: 0.85,
        lane_change: 1.15,
        pack_racing: 0.9,
        start_dash: 1.25,
        corner_exit: 1.1,
        mid_race_kick: 0.9,
        focus: 1.1,
        pressure_resistance: 0.85,
        ..SkillSet::NEUTRAL
    },
    surge: None,
    early_pace: Some(EarlyPace {
        base: 1.3,
        spread: 0.4,
    }),
    exhaustion_penalty: 0.75,
};

pub const LEADER: StyleProfile = StyleProfile {
    base_velocity: 1.015,
    max_velocity: 1.015,
    acceleration: 1.06,
    stamina_drain: 1.15,
    aggression: (0.5, 0.3),
    skills: SkillSet {
        stamina_efficiency: 0.95,
        last_spurt: 0.95,
        stamina_recovery: 1.05,
        positioning_iq: 1.2,
        gap_sense: 1.1,
        start_dash: 1.1,
        corner_exit: 1.05,
        focus: 1.15,
        pressure_resistance: 1.05,
        ..SkillSet::NEUTRAL
    },
    surge: None,
    early_pace: Some(EarlyPace {
        base: 1.15,
        spread: 0.25,
    }),
    exhaustion_penalty: 0.85,
};

pub const STALKER: StyleProfile = StyleProfile {
    base_velocity: 1.0,
    max_velocity: 1.05,
    acceleration: 1.025,
    stamina_drain: 0.85,
    aggression: (0.4, 0.3),
    skills: SkillSet {
        corner: 1.15,
        stamina_efficiency: 0.9,
        last_spurt: 1.1,
        guts_reserve: 1.15,
        stamina_recovery: 1.15,
        pack_racing: 1.2,
        gap_sense: 1.25,
        positioning_iq: 1.15,
        corner_exit: 1.2,
        mid_race_kick: 1.15,
        start_dash: 0.95,
        pressure_resistance: 1.15,
        ..SkillSet::NEUTRAL
    },
    surge: Some(Surge {
        threshold: 0.70,
        min_stamina: 30.0,
        base_boost: 1.35,
        stamina_boost: 0.25,
    }),
    early_pace: None,
    exhaustion_penalty: 1.0,
};

pub const CLOSER: StyleProfile = StyleProfile {
    base_velocity: 0.985,
    max_velocity: 1.08,
    acceleration: 0.975,
    stamina_drain: 0.7,
    aggression: (0.3, 0.3),
    skills: SkillSet {
        top_speed: 1.2,
        stamina_efficiency: 0.85,
        gate: 0.9,
        last_spurt: 1.25,
        guts_reserve: 1.3,
        stamina_recovery: 1.25,
        pack_racing: 1.3,
        gap_sense: 1.15,
        lane_change: 1.2,
        start_dash: 0.75,
        mid_race_kick: 1.35,
        corner_exit: 1.15,
        pressure_resistance: 1.3,
        focus: 1.1,
        ..SkillSet::NEUTRAL
    },
    surge: Some(Surge {
        threshold: 0.65,
        min_stamina: 30.0,
        base_boost: 1.4,
        stamina_boost: 0.3,
    }),
    early_pace: None,
    exhaustion_penalty: 1.0,
};

/// Raw per-horse rolls before the style is applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub base_velocity: f64,
    pub max_velocity: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub power: f64,
    pub power_level: u32,
    pub aggression_roll: f64,
    pub skills: SkillSet,
}

impl BaseStats {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let speed_variance = rng.gen_range(0.9..1.1);
        let acceleration = (80.0 + rng.gen::<f64>() * 20.0) * speed_variance;

        Self {
            base_velocity: 180.0 * speed_variance,
            max_velocity: 260.0 * speed_variance,
            acceleration,
            deceleration: 30.0,
            power: rng.gen_range(0.6..1.0),
            power_level: rng.gen_range(70..=100),
            aggression_roll: rng.gen(),
            skills: SkillSet::roll(rng),
        }
    }
}

/// Stats a horse races with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    pub style: RunningStyle,
    pub base_velocity: f64,
    pub max_velocity: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub power: f64,
    pub power_level: u32,
    pub aggression: f64,
    pub stamina_drain_rate: f64,
    pub skills: SkillSet,
}

impl FinalStats {
    pub fn profile(&self) -> &'static StyleProfile {
        self.style.profile()
    }

    /// Pushback weight
    pub fn weight(&self) -> f64 {
        f64::from(self.power_level) / 100.0
    }

    /// Secondary stamina pool available once primary stamina runs out.
    pub fn guts_pool(&self) -> f64 {
        self.skills.guts_reserve * 50.0
    }
}

/// Apply a running style to rolled stats.
pub fn derive_stats(base: &BaseStats, style: RunningStyle) -> FinalStats {
    let profile = style.profile();
    let (aggression_floor, aggression_span) = profile.aggression;

    FinalStats {
        style,
        base_velocity: base.base_velocity * profile.base_velocity,
        max_velocity: base.max_velocity * profile.max_velocity,
        acceleration: base.acceleration * profile.acceleration,
        deceleration: base.deceleration,
        power: base.power,
        power_level: base.power_level,
        aggression: aggression_floor + base.aggression_roll * aggression_span,
        stamina_drain_rate: profile.stamina_drain,
        skills: base.skills.scaled(&profile.skills).clamped(),
    }
}
