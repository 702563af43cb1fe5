use fieldnav_core::normalize_angle_deg;
use serde::{Deserialize, Serialize};

use crate::geo::{distance_and_bearing, GeoPoint, FEET_PER_METER};
use crate::FieldError;

/// Middle of the red end zone.
pub const RED_HOME: GeoPoint = GeoPoint::new(39.485297, -87.325922);
/// Middle of the blue end zone.
pub const BLUE_HOME: GeoPoint = GeoPoint::new(39.485549, -87.324796);

/// Practice frame: front circle as origin, front entrance on the X axis.
pub const PRACTICE_ORIGIN: GeoPoint = GeoPoint::new(39.482363, -87.323982);
pub const PRACTICE_ON_X_AXIS: GeoPoint = GeoPoint::new(39.480954, -87.323427);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn home(self) -> GeoPoint {
        match self {
            Team::Red => RED_HOME,
            Team::Blue => BLUE_HOME,
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

/// A field position derived from one GPS fix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldFix {
    pub x_ft: f64,
    pub y_ft: f64,
    /// Field heading from the receiver's course over ground, when it has one.
    pub heading_deg: Option<f64>,
}

/// Local Cartesian field frame anchored on two surveyed GPS points.
///
/// `origin` maps to `(0, 0)`; `on_x_axis` is any point on the positive X
/// axis. Y is positive to the left when looking down +X, so headings are
/// counter-clockwise like the rest of the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldFrame {
    pub origin: GeoPoint,
    pub on_x_axis: GeoPoint,
}

impl Default for FieldFrame {
    fn default() -> Self {
        Self {
            origin: PRACTICE_ORIGIN,
            on_x_axis: PRACTICE_ON_X_AXIS,
        }
    }
}

impl FieldFrame {
    pub fn new(origin: GeoPoint, on_x_axis: GeoPoint) -> Self {
        Self { origin, on_x_axis }
    }

    /// Frame for a team: origin at its own home, X axis toward the opponent's.
    pub fn for_team(team: Team) -> Self {
        Self::new(team.home(), team.opponent().home())
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        self.origin.validate()?;
        self.on_x_axis.validate()?;
        if self.origin == self.on_x_axis {
            return Err(FieldError::DegenerateFrame);
        }
        Ok(())
    }

    /// Compass bearing of the field's +X axis, degrees east of north.
    pub fn field_bearing_deg(&self) -> f64 {
        distance_and_bearing(self.origin, self.on_x_axis).1
    }

    /// Project a GPS fix into field feet.
    ///
    /// `gps_bearing_deg` is the receiver's course over ground (degrees east of
    /// north); pass `None` when the receiver did not report one.
    pub fn to_field(
        &self,
        fix: GeoPoint,
        gps_bearing_deg: Option<f64>,
    ) -> Result<FieldFix, FieldError> {
        self.validate()?;
        fix.validate()?;

        let field_bearing = self.field_bearing_deg();
        let (dist_m, bearing) = distance_and_bearing(self.origin, fix);
        let theta = (field_bearing - bearing).to_radians();

        let heading_deg = match gps_bearing_deg {
            Some(b) if b.is_finite() => Some(normalize_angle_deg(field_bearing - b)),
            Some(b) => return Err(FieldError::InvalidBearing(b)),
            None => None,
        };

        Ok(FieldFix {
            x_ft: dist_m * theta.cos() * FEET_PER_METER,
            y_ft: dist_m * theta.sin() * FEET_PER_METER,
            heading_deg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn homes_are_a_field_length_apart() {
        let frame = FieldFrame::for_team(Team::Red);
        let fix = frame.to_field(BLUE_HOME, None).expect("fix");
        // Roughly 100 m between the end zones.
        assert!(fix.x_ft > 300.0 && fix.x_ft < 360.0, "x = {}", fix.x_ft);
        assert_abs_diff_eq!(fix.y_ft, 0.0, epsilon = 1e-6);
        assert_eq!(fix.heading_deg, None);
    }

    #[test]
    fn teams_see_mirrored_fields() {
        let red = FieldFrame::for_team(Team::Red);
        let blue = FieldFrame::for_team(Team::Blue);
        assert_eq!(red.origin, blue.on_x_axis);
        assert_eq!(blue.origin, red.on_x_axis);

        let a = red.to_field(BLUE_HOME, None).expect("red").x_ft;
        let b = blue.to_field(RED_HOME, None).expect("blue").x_ft;
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }

    #[test]
    fn point_right_of_x_axis_has_negative_y() {
        let frame = FieldFrame::for_team(Team::Red);
        let right = frame
            .origin
            .destination(frame.field_bearing_deg() + 90.0, 10.0);
        let fix = frame.to_field(right, None).expect("fix");
        assert_abs_diff_eq!(fix.x_ft, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fix.y_ft, -10.0 * FEET_PER_METER, epsilon = 1e-3);
    }

    #[test]
    fn heading_from_course_over_ground() {
        let frame = FieldFrame::for_team(Team::Red);
        let fb = frame.field_bearing_deg();
        let fix = frame.to_field(RED_HOME, Some(fb)).expect("fix");
        assert_abs_diff_eq!(fix.heading_deg.expect("heading"), 0.0, epsilon = 1e-9);

        // Driving 90° clockwise of +X is heading -90 in the field frame.
        let fix = frame.to_field(RED_HOME, Some(fb + 90.0)).expect("fix");
        assert_abs_diff_eq!(fix.heading_deg.expect("heading"), -90.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_frame_is_rejected() {
        let frame = FieldFrame::new(RED_HOME, RED_HOME);
        assert_eq!(frame.to_field(BLUE_HOME, None), Err(FieldError::DegenerateFrame));
    }

    #[test]
    fn practice_frame_is_default() {
        let frame: FieldFrame = serde_json::from_str("{}").expect("json");
        assert_eq!(frame, FieldFrame::default());
        assert!(frame.validate().is_ok());
    }
}
