//! Track - Parametric oval geometry
//!
//! Two straights joined by two semicircular curves. Horses run the bottom
//! straight toward +X, climb the right curve, run the top straight toward -X
//! and drop down the left curve, so the infield is always on their left.
//! All boundaries are derived from `TrackConfig`; nothing depends on art.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::race_sim::config::TrackConfig;
use crate::race_sim::error::ConfigError;
use crate::race_sim::vector::Vec2;

/// Named track section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKind {
    TopStraight,
    BottomStraight,
    LeftCurve,
    RightCurve,
}

impl SectionKind {
    /// Sections in travel order, starting where track distance is zero.
    pub const RACE_ORDER: [SectionKind; 4] = [
        SectionKind::BottomStraight,
        SectionKind::RightCurve,
        SectionKind::TopStraight,
        SectionKind::LeftCurve,
    ];

    pub fn is_curve(self) -> bool {
        matches!(self, SectionKind::LeftCurve | SectionKind::RightCurve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SectionShape {
    Straight {
        /// Lane centerline
        center_y: f64,
        /// Lane edge nearest the infield
        inner_y: f64,
        /// Lane edge nearest the outer rail
        outer_y: f64,
        /// Direction of travel in degrees
        direction: f64,
    },
    Curve {
        center: Vec2,
        inner_radius: f64,
        outer_radius: f64,
    },
}

/// One of the four regions partitioning the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub shape: SectionShape,
}

/// Starting gate slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Vec2,
    /// Heading in degrees
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    pub config: TrackConfig,
    /// Inner rail radius of both curves
    pub inner_radius: f64,
    /// Outer rail radius of both curves
    pub outer_radius: f64,
    /// Length of each straight along the centerline
    pub straight_length: f64,
    /// Middle of the infield
    pub center: Vec2,
    /// Gate x on the bottom straight
    pub start_line_x: f64,
    /// Finish x on the top straight
    pub finish_line_x: f64,
    top: Section,
    bottom: Section,
    left: Section,
    right: Section,
}

impl TrackGeometry {
    /// Lay out the four sections for a validated config.
    pub fn new(config: &TrackConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let center = Vec2::new(config.track_width / 2.0, config.track_height / 2.0);
        let half_lane = config.lane_width / 2.0;
        let inner_radius = config.curve_radius - half_lane;
        let outer_radius = config.curve_radius + half_lane;
        let straight_length = config.track_width - 2.0 * outer_radius;

        let left_cx = outer_radius;
        let right_cx = config.track_width - outer_radius;

        let curve = |kind, cx: f64, x_min, x_max| Section {
            kind,
            x_min,
            x_max,
            y_min: center.y - outer_radius,
            y_max: center.y + outer_radius,
            shape: SectionShape::Curve {
                center: Vec2::new(cx, center.y),
                inner_radius,
                outer_radius,
            },
        };
        let left = curve(SectionKind::LeftCurve, left_cx, 0.0, left_cx);
        let right = curve(SectionKind::RightCurve, right_cx, right_cx, config.track_width);

        let top_y = center.y - config.curve_radius;
        let bottom_y = center.y + config.curve_radius;
        let top = Section {
            kind: SectionKind::TopStraight,
            x_min: left_cx,
            x_max: right_cx,
            y_min: 0.0,
            y_max: center.y,
            shape: SectionShape::Straight {
                center_y: top_y,
                inner_y: top_y + half_lane,
                outer_y: top_y - half_lane,
                direction: 180.0,
            },
        };
        let bottom = Section {
            kind: SectionKind::BottomStraight,
            x_min: left_cx,
            x_max: right_cx,
            y_min: center.y,
            y_max: config.track_height,
            shape: SectionShape::Straight {
                center_y: bottom_y,
                inner_y: bottom_y - half_lane,
                outer_y: bottom_y + half_lane,
                direction: 0.0,
            },
        };

        Ok(Self {
            config: config.clone(),
            inner_radius,
            outer_radius,
            straight_length,
            center,
            start_line_x: center.x + config.start_line_offset,
            finish_line_x: center.x - config.finish_line_offset,
            top,
            bottom,
            left,
            right,
        })
    }

    /// Section of the given kind.
    pub fn section(&self, kind: SectionKind) -> &Section {
        match kind {
            SectionKind::TopStraight => &self.top,
            SectionKind::BottomStraight => &self.bottom,
            SectionKind::LeftCurve => &self.left,
            SectionKind::RightCurve => &self.right,
        }
    }

    /// Curves are picked by X against the curve centers, the band between
    /// them is split by Y against the vertical center.
    pub fn section_at(&self, p: Vec2) -> &Section {
        if p.x <= self.left.x_max {
            &self.left
        } else if p.x >= self.right.x_min {
            &self.right
        } else if p.y < self.center.y {
            &self.top
        } else {
            &self.bottom
        }
    }

    /// Ideal heading at a point, degrees.
    pub fn target_angle(&self, p: Vec2) -> f64 {
        match self.section_at(p).shape {
            SectionShape::Straight { direction, .. } => direction,
            SectionShape::Curve { center, .. } => {
                let d = p - center;
                // atan2(-dx, dy) is the tangent in the racing direction for
                // both curves in Y-down screen space.
                (-d.x).atan2(d.y).to_degrees()
            }
        }
    }

    /// Between the inner and outer rail of the section containing `p`.
    pub fn is_on_track(&self, p: Vec2) -> bool {
        match self.section_at(p).shape {
            SectionShape::Straight {
                inner_y, outer_y, ..
            } => {
                let (min_y, max_y) = (inner_y.min(outer_y), inner_y.max(outer_y));
                p.y >= min_y && p.y <= max_y
            }
            SectionShape::Curve {
                center,
                inner_radius,
                outer_radius,
            } => {
                let r = p.distance(center);
                r >= inner_radius && r <= outer_radius
            }
        }
    }

    /// Outside the lane, in the infield or past the outer rail.
    pub fn is_colliding(&self, p: Vec2) -> bool {
        !self.is_on_track(p)
    }

    /// Inside the barrier rectangle enclosing the whole track area.
    pub fn within_bounds(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.config.track_width && p.y >= 0.0 && p.y <= self.config.track_height
    }

    /// A ray or probe sample at `p` has hit something.
    pub fn is_blocked(&self, p: Vec2) -> bool {
        !self.within_bounds(p) || self.is_colliding(p)
    }

    /// Position across the lane: -1 at the inner rail, +1 at the outer rail.
    pub fn lane_offset(&self, p: Vec2) -> f64 {
        let half_lane = self.config.lane_width / 2.0;
        let section = self.section_at(p);
        let offset = match section.shape {
            SectionShape::Straight { center_y, .. } => {
                let from_center = p.y - center_y;
                // The outer rail of the top straight is toward -Y.
                if section.kind == SectionKind::TopStraight {
                    -from_center / half_lane
                } else {
                    from_center / half_lane
                }
            }
            SectionShape::Curve { center, .. } => {
                (p.distance(center) - self.config.curve_radius) / half_lane
            }
        };
        offset.clamp(-1.0, 1.0)
    }

    /// Distance to the inner rail, for positions on the racing surface.
    pub fn distance_to_inner_rail(&self, p: Vec2) -> Option<f64> {
        if !self.is_on_track(p) {
            return None;
        }
        Some((self.lane_offset(p) + 1.0) * self.config.lane_width / 2.0)
    }

    /// Projection onto the lane centerline.
    pub fn racing_line_point(&self, p: Vec2) -> Vec2 {
        let section = self.section_at(p);
        match section.shape {
            SectionShape::Straight { center_y, .. } => Vec2::new(p.x, center_y),
            SectionShape::Curve { center, .. } => {
                center + self.radial(section.kind, p - center) * self.config.curve_radius
            }
        }
    }

    /// Closest point at least `margin` inside the lane edges.
    pub fn nearest_in_lane(&self, p: Vec2, margin: f64) -> Vec2 {
        let half_lane = self.config.lane_width / 2.0;
        let margin = margin.clamp(0.0, half_lane);
        let section = self.section_at(p);
        match section.shape {
            SectionShape::Straight { center_y, .. } => Vec2::new(
                p.x,
                p.y.clamp(center_y - half_lane + margin, center_y + half_lane - margin),
            ),
            SectionShape::Curve {
                center,
                inner_radius,
                outer_radius,
            } => {
                let r = p
                    .distance(center)
                    .clamp(inner_radius + margin, outer_radius - margin);
                center + self.radial(section.kind, p - center) * r
            }
        }
    }

    /// Horses get sprint bursts along the straights.
    pub fn in_sprint_zone(&self, p: Vec2) -> bool {
        !self.section_at(p).kind.is_curve() && self.is_on_track(p)
    }

    /// Centerline length of one lap.
    pub fn total_length(&self) -> f64 {
        2.0 * self.straight_length + TAU * self.config.curve_radius
    }

    fn arc_length(&self) -> f64 {
        PI * self.config.curve_radius
    }

    /// Arclength along the travel direction from the start of the bottom
    /// straight, plus `lap` full laps. Continuous across every section
    /// boundary.
    pub fn track_distance(&self, p: Vec2, lap: u32) -> f64 {
        let straight = self.straight_length;
        let arc = self.arc_length();
        let section = self.section_at(p);

        let along = match (section.kind, section.shape) {
            (SectionKind::BottomStraight, _) => (p.x - section.x_min).clamp(0.0, straight),
            (SectionKind::RightCurve, SectionShape::Curve { center, .. }) => {
                let d = p - center;
                // Bottom of the curve is +pi/2, top is -pi/2.
                let fraction = (FRAC_PI_2 - d.y.atan2(d.x)) / PI;
                straight + arc * fraction.clamp(0.0, 1.0)
            }
            (SectionKind::TopStraight, _) => {
                straight + arc + (section.x_max - p.x).clamp(0.0, straight)
            }
            (SectionKind::LeftCurve, SectionShape::Curve { center, .. }) => {
                let d = p - center;
                let mut angle = d.y.atan2(d.x);
                if angle < 0.0 {
                    angle += TAU;
                }
                // Top of the curve is 3pi/2, bottom is pi/2.
                let fraction = (1.5 * PI - angle) / PI;
                2.0 * straight + arc + arc * fraction.clamp(0.0, 1.0)
            }
            _ => 0.0,
        };

        along + f64::from(lap) * self.total_length()
    }

    /// Point on the lane centerline `distance` units along the track.
    pub fn centerline_point(&self, distance: f64) -> Vec2 {
        let straight = self.straight_length;
        let arc = self.arc_length();
        let radius = self.config.curve_radius;
        let mut s = distance.rem_euclid(self.total_length());

        if s < straight {
            return Vec2::new(self.bottom.x_min + s, self.center.y + radius);
        }
        s -= straight;
        if s < arc {
            let theta = FRAC_PI_2 - s / radius;
            return self.curve_center(SectionKind::RightCurve) + Vec2::new(theta.cos(), theta.sin()) * radius;
        }
        s -= arc;
        if s < straight {
            return Vec2::new(self.top.x_max - s, self.center.y - radius);
        }
        s -= straight;
        let theta = 1.5 * PI - s / radius;
        self.curve_center(SectionKind::LeftCurve) + Vec2::new(theta.cos(), theta.sin()) * radius
    }

    /// Gate slots spread evenly across the bottom straight at the start line.
    pub fn spawn_positions(&self, count: usize) -> Vec<SpawnPoint> {
        let (inner_y, direction) = match self.bottom.shape {
            SectionShape::Straight {
                inner_y, direction, ..
            } => (inner_y, direction),
            SectionShape::Curve { .. } => (self.center.y, 0.0),
        };
        let lane_step = self.config.lane_width / (count as f64 + 1.0);

        (0..count)
            .map(|i| SpawnPoint {
                position: Vec2::new(self.start_line_x, inner_y + lane_step * (i as f64 + 1.0)),
                angle: direction,
            })
            .collect()
    }

    /// Start line on the lane center.
    pub fn start_point(&self) -> Vec2 {
        Vec2::new(self.start_line_x, self.center.y + self.config.curve_radius)
    }

    /// Finish line on the lane center.
    pub fn finish_point(&self) -> Vec2 {
        Vec2::new(self.finish_line_x, self.center.y - self.config.curve_radius)
    }

    fn curve_center(&self, kind: SectionKind) -> Vec2 {
        match self.section(kind).shape {
            SectionShape::Curve { center, .. } => center,
            SectionShape::Straight { .. } => self.center,
        }
    }

    /// Unit radial direction, falling back to the curve's outward axis at
    /// the exact center.
    fn radial(&self, kind: SectionKind, d: Vec2) -> Vec2 {
        let unit = d.normalize();
        if unit != Vec2::ZERO {
            return unit;
        }
        match kind {
            SectionKind::LeftCurve => Vec2::new(-1.0, 0.0),
            _ => Vec2::new(1.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_sim::vector::wrap_degrees;

    fn track() -> TrackGeometry {
        TrackGeometry::new(&TrackConfig::default()).unwrap()
    }

    #[test]
    fn derived_dimensions_match_reference_track() {
        let t = track();
        assert_eq!(t.inner_radius, 210.0);
        assert_eq!(t.outer_radius, 390.0);
        assert_eq!(t.straight_length, 1620.0);
        let expected = 2.0 * 1620.0 + TAU * 300.0;
        assert!((t.total_length() - expected).abs() < 1e-9);
    }

    #[test]
    fn sections_are_picked_by_curve_centers_then_vertical_center() {
        let t = track();
        assert_eq!(t.section_at(Vec2::new(100.0, 600.0)).kind, SectionKind::LeftCurve);
        assert_eq!(t.section_at(Vec2::new(390.0, 300.0)).kind, SectionKind::LeftCurve);
        assert_eq!(t.section_at(Vec2::new(2010.0, 900.0)).kind, SectionKind::RightCurve);
        assert_eq!(t.section_at(Vec2::new(1200.0, 300.0)).kind, SectionKind::TopStraight);
        assert_eq!(t.section_at(Vec2::new(1200.0, 900.0)).kind, SectionKind::BottomStraight);
    }

    #[test]
    fn straights_have_fixed_headings() {
        let t = track();
        for y in [0.0, 250.0, 300.0, 599.0] {
            assert_eq!(t.target_angle(Vec2::new(1000.0, y)), 180.0);
        }
        for y in [600.0, 850.0, 900.0, 1199.0] {
            assert_eq!(t.target_angle(Vec2::new(1000.0, y)), 0.0);
        }
    }

    #[test]
    fn curve_tangents_follow_race_direction() {
        let t = track();
        // Leftmost point of the left curve heads down the screen.
        assert!((t.target_angle(Vec2::new(90.0, 600.0)) - 90.0).abs() < 1e-9);
        // Rightmost point of the right curve heads up the screen.
        assert!((t.target_angle(Vec2::new(2310.0, 600.0)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn heading_is_continuous_across_section_boundaries() {
        let t = track();
        let boundaries = [
            (2010.0, 900.0),
            (2010.0, 300.0),
            (390.0, 300.0),
            (390.0, 900.0),
        ];
        for (x, y) in boundaries {
            for lane_dy in [-80.0, 0.0, 80.0] {
                let a = t.target_angle(Vec2::new(x - 0.5, y + lane_dy));
                let b = t.target_angle(Vec2::new(x + 0.5, y + lane_dy));
                assert!(
                    wrap_degrees(a - b).abs() < 5.0,
                    "jump at ({x}, {}): {a} vs {b}",
                    y + lane_dy
                );
            }
        }
    }

    #[test]
    fn on_track_matches_lane_band() {
        let t = track();
        assert!(t.is_on_track(Vec2::new(1200.0, 900.0)));
        assert!(t.is_on_track(Vec2::new(1200.0, 810.0)));
        assert!(!t.is_on_track(Vec2::new(1200.0, 800.0)));
        assert!(!t.is_on_track(Vec2::new(1200.0, 1000.0)));
        assert!(t.is_on_track(Vec2::new(90.0, 600.0)));
        assert!(!t.is_on_track(Vec2::new(390.0, 600.0)));
    }

    #[test]
    fn lane_offset_is_negative_toward_infield() {
        let t = track();
        assert_eq!(t.lane_offset(Vec2::new(1200.0, 810.0)), -1.0);
        assert_eq!(t.lane_offset(Vec2::new(1200.0, 990.0)), 1.0);
        assert_eq!(t.lane_offset(Vec2::new(1200.0, 390.0)), -1.0);
        assert_eq!(t.lane_offset(Vec2::new(1200.0, 210.0)), 1.0);
        assert!((t.lane_offset(Vec2::new(390.0 - 345.0, 600.0)) - 0.5).abs() < 1e-9);
        assert_eq!(t.lane_offset(Vec2::new(1200.0, 1190.0)), 1.0);
    }

    #[test]
    fn rail_distance_only_on_the_surface() {
        let t = track();
        let rail = t.distance_to_inner_rail(Vec2::new(1200.0, 850.0)).unwrap();
        assert!((rail - 40.0).abs() < 1e-9);
        assert_eq!(t.distance_to_inner_rail(Vec2::new(1200.0, 700.0)), None);
    }

    #[test]
    fn racing_line_of_curve_center_stays_in_curve() {
        let t = track();
        let p = t.racing_line_point(Vec2::new(390.0, 600.0));
        assert_eq!(t.section_at(p).kind, SectionKind::LeftCurve);
        assert!(t.is_on_track(p));
    }

    #[test]
    fn nearest_in_lane_pulls_outside_points_to_the_edge() {
        let t = track();
        let p = t.nearest_in_lane(Vec2::new(1200.0, 1100.0), 5.0);
        assert_eq!(p, Vec2::new(1200.0, 985.0));
        assert!(t.is_on_track(p));
    }

    #[test]
    fn track_distance_has_no_jump_at_boundaries() {
        let t = track();
        let l = t.straight_length;
        let arc = PI * 300.0;
        let checks = [
            ((2009.999, 900.0), (2010.001, 900.0), l),
            ((2010.001, 300.0), (2009.999, 300.0), l + arc),
            ((390.001, 300.0), (389.999, 300.0), 2.0 * l + arc),
        ];
        for (before, after, expected) in checks {
            let a = t.track_distance(Vec2::new(before.0, before.1), 0);
            let b = t.track_distance(Vec2::new(after.0, after.1), 0);
            assert!((a - expected).abs() < 0.01, "{a} vs {expected}");
            assert!((b - expected).abs() < 0.01, "{b} vs {expected}");
        }
        // Closing the loop: end of the left curve meets the next lap.
        let end = t.track_distance(Vec2::new(389.999, 900.0), 0);
        let next = t.track_distance(Vec2::new(390.001, 900.0), 1);
        assert!((end - t.total_length()).abs() < 0.01);
        assert!((next - t.total_length()).abs() < 0.01);
    }

    #[test]
    fn spawn_positions_spread_across_lane_facing_forward() {
        let t = track();
        let spawns = t.spawn_positions(3);
        assert_eq!(spawns.len(), 3);
        let ys: Vec<f64> = spawns.iter().map(|s| s.position.y).collect();
        assert_eq!(ys, vec![855.0, 900.0, 945.0]);
        for s in &spawns {
            assert_eq!(s.position.x, 1400.0);
            assert_eq!(s.angle, 0.0);
            assert!(t.is_on_track(s.position));
        }
    }

    #[test]
    fn sprint_zones_are_the_straights() {
        let t = track();
        assert!(t.in_sprint_zone(Vec2::new(1200.0, 900.0)));
        assert!(!t.in_sprint_zone(Vec2::new(90.0, 600.0)));
        assert!(!t.in_sprint_zone(Vec2::new(1200.0, 700.0)));
    }

    #[test]
    fn start_and_finish_lines_sit_either_side_of_center() {
        let t = track();
        assert_eq!(t.start_point(), Vec2::new(1400.0, 900.0));
        assert_eq!(t.finish_point(), Vec2::new(1000.0, 300.0));
        assert_eq!(t.section_at(t.finish_point()).kind, SectionKind::TopStraight);
    }
}
