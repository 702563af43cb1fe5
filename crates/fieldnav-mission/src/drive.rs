use fieldnav_arc::ArcSolution;
use serde::{Deserialize, Serialize};

use crate::{MissionError, WheelSpeed};

/// Differential-drive geometry for following an arc.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcDriveParams {
    /// Distance between the wheel contact points, feet.
    pub track_width_ft: f64,
    /// Duty for the outer wheel.
    pub outer_duty: i16,
}

impl Default for ArcDriveParams {
    fn default() -> Self {
        Self {
            track_width_ft: 1.0,
            outer_duty: 255,
        }
    }
}

impl ArcDriveParams {
    pub fn validate(&self) -> Result<(), MissionError> {
        if !(self.track_width_ft.is_finite() && self.track_width_ft > 0.0) {
            return Err(MissionError::InvalidConfig {
                name: "track_width_ft",
                reason: format!("must be finite and > 0 (got {})", self.track_width_ft),
            });
        }
        Ok(())
    }
}

/// Inner/outer wheel speed ratio for a turn of radius `radius_ft` measured at
/// the robot centre: `(|R| - w/2) / (|R| + w/2)`.
///
/// Radii tighter than half the track width make the ratio negative, i.e. the
/// inner wheel turns backwards.
pub fn inner_outer_ratio(radius_ft: f64, track_width_ft: f64) -> f64 {
    let r = radius_ft.abs();
    let half = 0.5 * track_width_ft;
    (r - half) / (r + half)
}

/// Wheel command that follows `arc`. Left turns (negative radius) slow the
/// left wheel.
pub fn arc_wheel_speed(arc: &ArcSolution, params: &ArcDriveParams) -> WheelSpeed {
    let outer = params.outer_duty as i32;
    let inner = (params.outer_duty as f64 * inner_outer_ratio(arc.radius_ft, params.track_width_ft))
        .round() as i32;
    if arc.radius_ft < 0.0 {
        WheelSpeed::new(inner, outer)
    } else {
        WheelSpeed::new(outer, inner)
    }
}
