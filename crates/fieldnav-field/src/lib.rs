//! From raw sensors to field coordinates.
//!
//! - [`FieldFrame`] projects GPS latitude/longitude into field feet using two
//!   surveyed anchor points.
//! - [`FieldOrientation`] maps compass azimuth onto field heading and can be
//!   re-anchored when a better heading is known.
//! - [`PoseTracker`] dead-reckons between fixes and decides when GPS-derived
//!   headings are good enough to correct the compass.

mod frame;
mod geo;
mod orientation;
mod tracker;

use fieldnav_core::InputError;

pub use frame::{
    FieldFix, FieldFrame, Team, BLUE_HOME, PRACTICE_ON_X_AXIS, PRACTICE_ORIGIN, RED_HOME,
};
pub use geo::{distance_and_bearing, GeoPoint, EARTH_RADIUS_M, FEET_PER_METER};
pub use orientation::FieldOrientation;
pub use tracker::{FixUpdate, GpsSample, HeadingSource, PoseTracker, TrackerParams};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("latitude must be finite and within [-90, 90] (got {0})")]
    InvalidLatitude(f64),

    #[error("longitude must be finite and within [-180, 180] (got {0})")]
    InvalidLongitude(f64),

    #[error("GPS bearing must be finite (got {0})")]
    InvalidBearing(f64),

    #[error("field frame origin and X-axis point coincide")]
    DegenerateFrame,
}
