//! Arc-radius steering.
//!
//! Given a robot pose and a target point, find the circle tangent to the
//! robot's heading that passes through the target, and decide whether
//! driving that arc is a sensible way to get there.
//!
//! ```
//! use fieldnav_arc::{ArcParams, ArcSteeringSolver};
//! use fieldnav_core::{Point2D, Pose2D};
//!
//! let solver = ArcSteeringSolver::new(ArcParams::default()).unwrap();
//! let s = solver
//!     .solve(Pose2D::new(0.0, 0.0, 0.0), Point2D::new(10.0, 17.32))
//!     .unwrap();
//! assert!(s.radius_ft < 0.0); // left turn
//! assert!(s.recommended);
//! ```
//!
//! Radius sign convention: negative is a left (CCW) turn, positive a right
//! (CW) turn. Magnitudes stay within `[min_radius_ft, max_radius_ft]`.

mod circle;
mod params;
mod solver;

pub use circle::{circle_contains_target, turn_circle_center, TurnDirection};
pub use params::ArcParams;
pub use solver::{solve, sweep_angle_rad, ArcCase, ArcError, ArcSolution, ArcSteeringSolver};
