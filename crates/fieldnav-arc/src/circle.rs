//! Turn circles tangent to the robot's heading.
//!
//! Signed radius convention: negative turns left (centre at heading + 90°),
//! positive turns right (centre at heading − 90°). The centre always sits
//! `|radius|` away from the robot.

use fieldnav_core::{distance, normalize_angle_deg, Pose2D};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    #[inline]
    pub fn of_radius(signed_radius: f64) -> Self {
        if signed_radius < 0.0 {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        }
    }

    /// Apply this direction's sign to a radius magnitude.
    #[inline]
    pub fn signed(self, magnitude: f64) -> f64 {
        match self {
            TurnDirection::Left => -magnitude.abs(),
            TurnDirection::Right => magnitude.abs(),
        }
    }
}

/// Centre of the turn circle of the given signed radius.
pub fn turn_circle_center(pose: &Pose2D, signed_radius: f64) -> Point2<f64> {
    let offset = match TurnDirection::of_radius(signed_radius) {
        TurnDirection::Left => 90.0,
        TurnDirection::Right => -90.0,
    };
    let angle = normalize_angle_deg(pose.heading_deg + offset).to_radians();
    let r = signed_radius.abs();
    Point2::new(pose.x + r * angle.cos(), pose.y + r * angle.sin())
}

/// Whether `target` lies strictly inside the turn circle.
pub fn circle_contains_target(pose: &Pose2D, signed_radius: f64, target: Point2<f64>) -> bool {
    let center = turn_circle_center(pose, signed_radius);
    distance(center, target) < signed_radius.abs()
}
