use fieldnav_core::{normalize_angle_deg, target_heading_deg, Point2D, Pose2D};
use serde::{Deserialize, Serialize};

use crate::WheelSpeed;

/// Proportional heading-seek law.
///
/// The outer wheel runs at its straight-line duty; the inner wheel slows by
/// `duty_per_degree` for every degree of heading error, never below
/// `min_duty`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeekParams {
    pub duty_per_degree: f64,
    pub min_duty: i16,
    /// Left duty that drives straight (wheels are rarely matched).
    pub left_straight_duty: i16,
    pub right_straight_duty: i16,
}

impl Default for SeekParams {
    fn default() -> Self {
        Self {
            duty_per_degree: 3.0,
            min_duty: 150,
            left_straight_duty: 255,
            right_straight_duty: 255,
        }
    }
}

impl SeekParams {
    pub fn straight(&self) -> WheelSpeed {
        WheelSpeed::new(self.left_straight_duty as i32, self.right_straight_duty as i32)
    }
}

/// Wheel command steering from `pose` toward `target`.
pub fn seek_wheel_speed(pose: &Pose2D, target: Point2D, params: &SeekParams) -> WheelSpeed {
    let desired = target_heading_deg(pose.position(), target);
    let error = normalize_angle_deg(desired - pose.heading_deg);
    let slowdown = params.duty_per_degree * error.abs();

    let reduce = |full: i16| {
        let d = (full as f64 - slowdown).max(params.min_duty as f64);
        d.round() as i32
    };

    let (left, right) = if error > 0.0 {
        // Target to the left: slow the left wheel.
        (
            reduce(params.left_straight_duty),
            params.right_straight_duty as i32,
        )
    } else {
        (
            params.left_straight_duty as i32,
            reduce(params.right_straight_duty),
        )
    };
    WheelSpeed::new(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_course_drives_straight() {
        let ws = seek_wheel_speed(
            &Pose2D::new(0.0, 0.0, 0.0),
            Point2D::new(100.0, 0.0),
            &SeekParams::default(),
        );
        assert_eq!(ws, WheelSpeed::new(255, 255));
    }

    #[test]
    fn inner_wheel_slows_with_error() {
        let p = SeekParams::default();
        let pose = Pose2D::new(0.0, 0.0, 0.0);
        // 10 degrees left.
        let t = Point2D::new(10f64.to_radians().cos(), 10f64.to_radians().sin()) * 50.0;
        assert_eq!(seek_wheel_speed(&pose, t, &p), WheelSpeed::new(225, 255));
        // 20 degrees right.
        let t = Point2D::new(20f64.to_radians().cos(), -(20f64.to_radians().sin())) * 50.0;
        assert_eq!(seek_wheel_speed(&pose, t, &p), WheelSpeed::new(255, 195));
    }

    #[test]
    fn inner_wheel_is_floored() {
        let ws = seek_wheel_speed(
            &Pose2D::new(0.0, 0.0, 0.0),
            Point2D::new(-10.0, -1.0),
            &SeekParams::default(),
        );
        assert_eq!(ws, WheelSpeed::new(255, 150));
    }
}
