//! Great-circle helpers on a spherical Earth.
//!
//! Field-scale distances (a few hundred metres) make the spherical model
//! accurate to well under a foot, which is below GPS noise.

use serde::{Deserialize, Serialize};

use crate::FieldError;

/// Mean Earth radius (IUGG), metres.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub const FEET_PER_METER: f64 = 3.28084;

/// WGS84 latitude/longitude in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(FieldError::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(FieldError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }

    /// Point reached by travelling `distance_m` along the great circle
    /// leaving `self` at `bearing_deg` (degrees east of north).
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        let phi1 = self.latitude.to_radians();
        let lambda1 = self.longitude.to_radians();
        let theta = bearing_deg.to_radians();
        let delta = distance_m / EARTH_RADIUS_M;

        let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
        let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

        GeoPoint::new(phi2.to_degrees(), lambda2.to_degrees())
    }
}

/// Great-circle distance (metres) and initial bearing (degrees east of
/// north, in `(-180, 180]`) from `from` to `to`.
///
/// Coincident points give `(0.0, 0.0)`.
pub fn distance_and_bearing(from: GeoPoint, to: GeoPoint) -> (f64, f64) {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let distance = 2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    let bearing = fieldnav_core::normalize_angle_deg(y.atan2(x).to_degrees());

    (distance, bearing)
}
