//! Heading arithmetic in degrees.
//!
//! All helpers here are total over finite inputs and never loop, so a
//! corrupted heading such as `1e12` normalizes in constant time.

use nalgebra::Point2;

use crate::Pose2D;

/// Normalize any angle into `(-180, 180]` degrees.
///
/// `390.0` becomes `30.0`, `-180.0` becomes `180.0`. Non-finite input is
/// returned unchanged (NaN stays NaN).
#[inline]
pub fn normalize_angle_deg(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let r = angle % 360.0;
    if r <= -180.0 {
        r + 360.0
    } else if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

/// Heading (degrees) that points from `from` straight at `to`.
///
/// Does not depend on the robot's current heading.
#[inline]
pub fn target_heading_deg(from: Point2<f64>, to: Point2<f64>) -> f64 {
    let d = to - from;
    normalize_angle_deg(d.y.atan2(d.x).to_degrees())
}

/// Degrees to turn left (CCW) from `current` to reach `target`, in `[0, 360)`.
#[inline]
pub fn left_turn_delta_deg(current: f64, target: f64) -> f64 {
    let target = if target < current {
        target + 360.0
    } else {
        target
    };
    target - current
}

/// Degrees to turn right (CW) from `current` to reach `target`, in `[0, 360)`.
///
/// Mirror of [`left_turn_delta_deg`]; when both headings are equal both
/// deltas are zero.
#[inline]
pub fn right_turn_delta_deg(current: f64, target: f64) -> f64 {
    let target = if target > current {
        target - 360.0
    } else {
        target
    };
    current - target
}

/// Euclidean distance between two field points.
#[inline]
pub fn distance(a: Point2<f64>, b: Point2<f64>) -> f64 {
    nalgebra::distance(&a, &b)
}

/// Whether `target` lies to the left of the robot's heading.
///
/// A target exactly on the heading line (ahead or behind) is reported as
/// *not* on the left.
pub fn target_is_on_left(pose: &Pose2D, target: Point2<f64>) -> bool {
    let heading = normalize_angle_deg(pose.heading_deg);
    let target_heading = target_heading_deg(pose.position(), target);
    left_turn_delta_deg(heading, target_heading) < right_turn_delta_deg(heading, target_heading)
}
