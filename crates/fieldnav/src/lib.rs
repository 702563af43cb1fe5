//! Facade crate for the `fieldnav-*` workspace.
//!
//! ## Quickstart
//!
//! ```
//! use fieldnav::arc::{ArcParams, ArcSteeringSolver};
//! use fieldnav::core::{Point2D, Pose2D};
//!
//! let solver = ArcSteeringSolver::new(ArcParams::default()).unwrap();
//! let arc = solver
//!     .solve(Pose2D::new(0.0, 0.0, 0.0), Point2D::new(40.0, 20.0))
//!     .unwrap();
//! println!("radius {:.1} ft, arc {:.1} ft", arc.radius_ft, arc.arc_length_ft);
//! ```
//!
//! ## API map
//! - `fieldnav::core`: poses, angle helpers, input errors, logger.
//! - `fieldnav::blob`: blob location from contour polygons.
//! - `fieldnav::arc`: tangent-arc steering.
//! - `fieldnav::field`: GPS/compass to field frame, pose tracking.
//! - `fieldnav::mission`: mission state machine and controller commands.
//! - [`load_json`], [`replay`]: helpers used by the `fieldnav` CLI.

pub use fieldnav_arc as arc;
pub use fieldnav_blob as blob;
pub use fieldnav_core as core;
pub use fieldnav_field as field;
pub use fieldnav_mission as mission;

pub use fieldnav_arc::{ArcSolution, ArcSteeringSolver};
pub use fieldnav_blob::{BlobResult, MomentBlobLocator};
pub use fieldnav_core::{Point2D, Pose2D};

mod params;
mod replay;

pub use params::{load_json, LoadError};
pub use replay::{replay, ReplayStep, TimedEvent};
