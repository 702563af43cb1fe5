//! Colour-blob locator working directly on contour polygons.
//!
//! ## Quickstart
//!
//! ```
//! use fieldnav_blob::{BlobParams, MomentBlobLocator, Viewport};
//! use fieldnav_core::Point2D;
//!
//! let square = vec![
//!     Point2D::new(300.0, 200.0),
//!     Point2D::new(340.0, 200.0),
//!     Point2D::new(340.0, 240.0),
//!     Point2D::new(300.0, 240.0),
//! ];
//! let locator = MomentBlobLocator::new(BlobParams::default());
//! let result = locator.locate(&[square], Viewport::new(640.0, 480.0)).unwrap();
//! assert!(result.found);
//! ```
//!
//! Pipeline:
//! 1. Pick the contour with the largest shoelace area (first one wins ties).
//! 2. Reject it if its share of the frame is below `min_size_fraction`.
//! 3. Compute spatial moments with the Green's-theorem recurrence and take
//!    the centroid `(m10/m00, m01/m00)`.
//! 4. Normalize: `left_right = cy / (h/2) - 1`, `top_bottom = cx / w`.
//!    The image Y axis maps to the robot's left/right axis because the phone
//!    is mounted in landscape, rotated a quarter turn.

mod locator;
mod moments;

pub use locator::{
    contour_area, locate, select_largest_contour, BlobError, BlobParams, BlobResult,
    MomentBlobLocator, Viewport,
};
pub use moments::{CentralMoments, ContourMoments, MOMENT_EPSILON};
