use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{ensure_finite, normalize_angle_deg, InputError};

/// Robot position on the field (feet) and heading (degrees CCW from +X).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self { x, y, heading_deg }
    }

    #[inline]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Unit vector along the current heading.
    #[inline]
    pub fn heading_unit(&self) -> Vector2<f64> {
        let (s, c) = self.heading_deg.to_radians().sin_cos();
        Vector2::new(c, s)
    }

    /// Copy of this pose with the heading wrapped into `(-180, 180]`.
    pub fn normalized(&self) -> Self {
        Self {
            heading_deg: normalize_angle_deg(self.heading_deg),
            ..*self
        }
    }

    /// Reject poses with NaN or infinite components.
    pub fn validate(&self) -> Result<(), InputError> {
        ensure_finite("pose.x", self.x)?;
        ensure_finite("pose.y", self.y)?;
        ensure_finite("pose.heading_deg", self.heading_deg)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn heading_unit_follows_ccw_convention() {
        let u = Pose2D::new(0.0, 0.0, 90.0).heading_unit();
        assert_abs_diff_eq!(u.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn normalized_wraps_heading_only() {
        let p = Pose2D::new(3.0, 4.0, -270.0).normalized();
        assert_eq!((p.x, p.y), (3.0, 4.0));
        assert_abs_diff_eq!(p.heading_deg, 90.0);
    }

    #[test]
    fn validate_rejects_nan_heading() {
        let err = Pose2D::new(0.0, 0.0, f64::NAN).validate().unwrap_err();
        assert!(matches!(
            err,
            InputError::NonFinite {
                what: "pose.heading_deg",
                ..
            }
        ));
    }

    #[test]
    fn serde_uses_field_names() {
        let p: Pose2D = serde_json::from_str(r#"{"x":1.0,"y":2.0,"heading_deg":45.0}"#).unwrap();
        assert_eq!(p, Pose2D::new(1.0, 2.0, 45.0));
    }
}
