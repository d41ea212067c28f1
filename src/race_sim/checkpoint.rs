//! Checkpoint - Ordered capture points around the lane centerline
//!
//! A horse only ever advances to the next index in the ring, so laps cannot
//! be counted by cutting across the infield.

use serde::{Deserialize, Serialize};

use crate::race_sim::config::CheckpointConfig;
use crate::race_sim::track::TrackGeometry;
use crate::race_sim::vector::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Vec2,
    pub radius: f64,
}

impl Checkpoint {
    pub fn captures(&self, p: Vec2) -> bool {
        p.distance(self.position) < self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRing {
    points: Vec<Checkpoint>,
}

impl CheckpointRing {
    pub fn new(points: Vec<Checkpoint>) -> Self {
        Self { points }
    }

    /// Evenly spaced by arclength, checkpoint 0 on the start line.
    pub fn around(track: &TrackGeometry, config: &CheckpointConfig) -> Self {
        let start = track.track_distance(track.start_point(), 0);
        let spacing = track.total_length() / config.count as f64;

        let points = (0..config.count)
            .map(|i| Checkpoint {
                position: track.centerline_point(start + spacing * i as f64),
                radius: config.radius,
            })
            .collect();

        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.points.iter()
    }

    pub fn next_index(&self, index: usize) -> usize {
        if self.points.is_empty() {
            0
        } else {
            (index + 1) % self.points.len()
        }
    }

    /// Checkpoints passed plus the fraction of the way to the next one,
    /// projected onto the segment between them.
    pub fn continuous_progress(&self, current: usize, total_progress: u32, p: Vec2) -> f64 {
        let passed = f64::from(total_progress);
        let (Some(from), Some(to)) = (self.get(current), self.get(self.next_index(current))) else {
            return passed;
        };

        let segment = to.position - from.position;
        let length = segment.length();
        if length <= f64::EPSILON {
            return passed;
        }

        let along = (p - from.position).dot(segment * (1.0 / length));
        passed + along.clamp(0.0, length) / length
    }
}
