//! Core types and utilities for field navigation.
//!
//! This crate is small and purely geometric. It knows nothing
//! about cameras, GPS receivers or motor controllers; every input is a plain
//! number in field feet or degrees.
//!
//! Conventions shared by every `fieldnav-*` crate:
//! - headings are degrees counter-clockwise from the positive X axis,
//!   normalized into `(-180, 180]` before being returned or compared;
//! - distances and radii are feet and non-negative in magnitude.

mod angle;
mod error;
mod logger;
mod pose;

pub use angle::{
    distance, left_turn_delta_deg, normalize_angle_deg, right_turn_delta_deg, target_heading_deg,
    target_is_on_left,
};
pub use error::{ensure_finite, ensure_finite_point, InputError};
pub use pose::Pose2D;

/// A sample on a contour or a location on the field.
pub type Point2D = nalgebra::Point2<f64>;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_env, LOG_ENV_VAR};
