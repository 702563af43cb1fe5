use fieldnav_core::{ensure_finite_point, InputError};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::moments::ContourMoments;

/// Errors produced by the blob locator.
///
/// Only malformed input ends up here; "nothing to see" is a regular
/// [`BlobResult`] with `found == false`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BlobError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("min_size_fraction must be finite and >= 0 (got {0})")]
    InvalidMinSizeFraction(f64),
}

/// Pixel size of the camera frame the contours were extracted from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn validate(&self) -> Result<(), InputError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(InputError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Blob locator settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobParams {
    /// Smallest share of the frame (0.001 = 0.1 %) a blob must cover to count.
    pub min_size_fraction: f64,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            min_size_fraction: 0.001,
        }
    }
}

impl BlobParams {
    pub fn validate(&self) -> Result<(), BlobError> {
        if self.min_size_fraction.is_finite() && self.min_size_fraction >= 0.0 {
            Ok(())
        } else {
            Err(BlobError::InvalidMinSizeFraction(self.min_size_fraction))
        }
    }
}

/// Per-frame blob summary.
///
/// When `found` is false, `left_right` and `top_bottom` are NaN and
/// `size_fraction` is zero.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BlobResult {
    pub found: bool,
    /// -1 (robot's left) .. 1 (robot's right).
    #[serde(deserialize_with = "nan_from_null")]
    pub left_right: f64,
    /// 0 .. 1 along the image width.
    #[serde(deserialize_with = "nan_from_null")]
    pub top_bottom: f64,
    /// Blob area divided by frame area.
    pub size_fraction: f64,
}

/// JSON writes NaN as `null`; read it back as NaN.
fn nan_from_null<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

impl BlobResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            left_right: f64::NAN,
            top_bottom: f64::NAN,
            size_fraction: 0.0,
        }
    }

    /// `(left_right, top_bottom)` if a blob was found.
    pub fn location(&self) -> Option<(f64, f64)> {
        self.found.then_some((self.left_right, self.top_bottom))
    }

    /// Pixel position of the blob centroid, for drawing an overlay marker.
    pub fn overlay_point(&self, viewport: Viewport) -> Option<Point2<f64>> {
        let (lr, tb) = self.location()?;
        Some(Point2::new(
            tb * viewport.width,
            (lr + 1.0) / 2.0 * viewport.height,
        ))
    }
}

/// Shoelace area of the closed polygon through `contour`.
pub fn contour_area(contour: &[Point2<f64>]) -> f64 {
    let Some(last) = contour.last() else {
        return 0.0;
    };
    let mut prev = last;
    let mut twice_area = 0.0;
    for p in contour {
        twice_area += prev.x * p.y - p.x * prev.y;
        prev = p;
    }
    0.5 * twice_area.abs()
}

/// Index and area of the largest contour; the earliest wins on ties.
pub fn select_largest_contour<C: AsRef<[Point2<f64>]>>(contours: &[C]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, contour) in contours.iter().enumerate() {
        let area = contour_area(contour.as_ref());
        if best.map(|(_, a)| area > a).unwrap_or(true) {
            best = Some((idx, area));
        }
    }
    best
}

/// Stateless locator; cheap to copy and safe to share across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct MomentBlobLocator {
    params: BlobParams,
}

impl MomentBlobLocator {
    pub fn new(params: BlobParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BlobParams {
        &self.params
    }

    /// Find the dominant blob among `contours` and express its centroid in
    /// frame-relative coordinates.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, contours), fields(n = contours.len()))
    )]
    pub fn locate<C: AsRef<[Point2<f64>]>>(
        &self,
        contours: &[C],
        viewport: Viewport,
    ) -> Result<BlobResult, BlobError> {
        self.params.validate()?;
        viewport.validate()?;
        for contour in contours {
            for p in contour.as_ref() {
                ensure_finite_point("contour point", *p)?;
            }
        }

        let Some((idx, area)) = select_largest_contour(contours) else {
            return Ok(BlobResult::not_found());
        };

        let size_fraction = area / viewport.area();
        if !size_fraction.is_finite() {
            warn!("largest contour #{idx} area overflowed ({area}), ignoring it");
            return Ok(BlobResult::not_found());
        }
        if size_fraction < self.params.min_size_fraction {
            debug!(
                "largest contour #{idx} covers {size_fraction:.5} of the frame, below {:.5}",
                self.params.min_size_fraction
            );
            return Ok(BlobResult::not_found());
        }

        let Some(moments) = ContourMoments::from_contour(contours[idx].as_ref()) else {
            debug!("largest contour #{idx} has degenerate moments");
            return Ok(BlobResult::not_found());
        };

        let c = moments.centroid();
        let left_right = c.y / (viewport.height / 2.0) - 1.0;
        let top_bottom = c.x / viewport.width;
        if !(left_right.is_finite() && top_bottom.is_finite()) {
            warn!("largest contour #{idx} centroid is not finite ({}, {})", c.x, c.y);
            return Ok(BlobResult::not_found());
        }
        Ok(BlobResult {
            found: true,
            left_right,
            top_bottom,
            size_fraction,
        })
    }
}

/// One-shot form of [`MomentBlobLocator::locate`].
pub fn locate<C: AsRef<[Point2<f64>]>>(
    contours: &[C],
    viewport_width: f64,
    viewport_height: f64,
    min_size_fraction: f64,
) -> Result<BlobResult, BlobError> {
    MomentBlobLocator::new(BlobParams { min_size_fraction })
        .locate(contours, Viewport::new(viewport_width, viewport_height))
}
