//! Closed-form polygon moments.
//!
//! For a closed polygon the spatial moments up to order 3 can be computed
//! exactly from its vertices using Green's theorem, without rasterizing the
//! region. Each consecutive vertex pair `(p_{i-1}, p_i)` contributes the cross
//! term `dxy = x_{i-1}·y_i − x_i·y_{i-1}`; the accumulated sums are scaled by
//! fixed constants (1/2, 1/6, 1/12, ...) whose sign follows the sign of the
//! area sum so that clockwise and counter-clockwise contours give identical
//! moments.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Area sums at or below this magnitude are treated as degenerate.
///
/// Single-precision machine epsilon, the same cut-off image libraries use.
pub const MOMENT_EPSILON: f64 = 1.192_092_9e-7;

/// Spatial moments `m_pq` of a polygon, `p + q <= 3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
}

/// Moments about the centroid, `mu_pq`, `2 <= p + q <= 3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralMoments {
    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
    pub mu30: f64,
    pub mu21: f64,
    pub mu12: f64,
    pub mu03: f64,
}

impl ContourMoments {
    /// Moments of the closed polygon through `contour` (last vertex joins the
    /// first).
    ///
    /// Returns `None` for an empty contour or when the enclosed area is
    /// numerically zero (one or two points, collinear points), since the
    /// centroid is undefined in that case.
    pub fn from_contour(contour: &[Point2<f64>]) -> Option<Self> {
        let last = contour.last()?;

        let mut a00 = 0.0;
        let mut a10 = 0.0;
        let mut a01 = 0.0;
        let mut a20 = 0.0;
        let mut a11 = 0.0;
        let mut a02 = 0.0;
        let mut a30 = 0.0;
        let mut a21 = 0.0;
        let mut a12 = 0.0;
        let mut a03 = 0.0;

        let (mut xp, mut yp) = (last.x, last.y);
        let (mut xp2, mut yp2) = (xp * xp, yp * yp);

        for p in contour {
            let (x, y) = (p.x, p.y);
            let x2 = x * x;
            let y2 = y * y;
            let dxy = xp * y - x * yp;
            let xs = xp + x;
            let ys = yp + y;

            a00 += dxy;
            a10 += dxy * xs;
            a01 += dxy * ys;
            a20 += dxy * (xp * xs + x2);
            a11 += dxy * (xp * (ys + yp) + x * (ys + y));
            a02 += dxy * (yp * ys + y2);
            a30 += dxy * xs * (xp2 + x2);
            a03 += dxy * ys * (yp2 + y2);
            a21 += dxy * (xp2 * (3.0 * yp + y) + 2.0 * x * xp * ys + x2 * (yp + 3.0 * y));
            a12 += dxy * (yp2 * (3.0 * xp + x) + 2.0 * y * yp * xs + y2 * (xp + 3.0 * x));

            xp = x;
            yp = y;
            xp2 = x2;
            yp2 = y2;
        }

        if a00.abs() <= MOMENT_EPSILON {
            return None;
        }

        let sign = a00.signum();
        Some(Self {
            m00: a00 * sign / 2.0,
            m10: a10 * sign / 6.0,
            m01: a01 * sign / 6.0,
            m20: a20 * sign / 12.0,
            m11: a11 * sign / 24.0,
            m02: a02 * sign / 12.0,
            m30: a30 * sign / 20.0,
            m21: a21 * sign / 60.0,
            m12: a12 * sign / 60.0,
            m03: a03 * sign / 20.0,
        })
    }

    /// Enclosed area (always positive for a value built by `from_contour`).
    #[inline]
    pub fn area(&self) -> f64 {
        self.m00
    }

    /// Centre of mass `(m10/m00, m01/m00)`.
    #[inline]
    pub fn centroid(&self) -> Point2<f64> {
        Point2::new(self.m10 / self.m00, self.m01 / self.m00)
    }

    pub fn central(&self) -> CentralMoments {
        let c = self.centroid();
        let (cx, cy) = (c.x, c.y);

        let mu20 = self.m20 - self.m10 * cx;
        let mu11 = self.m11 - self.m10 * cy;
        let mu02 = self.m02 - self.m01 * cy;

        CentralMoments {
            mu20,
            mu11,
            mu02,
            mu30: self.m30 - cx * (3.0 * mu20 + cx * self.m10),
            mu21: self.m21 - cx * (2.0 * mu11 + cx * self.m01) - cy * mu20,
            mu12: self.m12 - cy * (2.0 * mu11 + cy * self.m10) - cx * mu02,
            mu03: self.m03 - cy * (3.0 * mu02 + cy * self.m01),
        }
    }
}

impl CentralMoments {
    /// Angle (radians) of the blob's major axis relative to the image X axis.
    pub fn orientation(&self) -> f64 {
        0.5 * (2.0 * self.mu11).atan2(self.mu20 - self.mu02)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ]
    }

    #[test]
    fn rectangle_at_origin_matches_closed_form() {
        let (w, h) = (4.0, 2.0);
        let m = ContourMoments::from_contour(&rect(0.0, 0.0, w, h)).expect("non-degenerate");
        assert_relative_eq!(m.m00, w * h);
        assert_relative_eq!(m.m10, w * w * h / 2.0);
        assert_relative_eq!(m.m01, w * h * h / 2.0);
        assert_relative_eq!(m.m20, w.powi(3) * h / 3.0);
        assert_relative_eq!(m.m02, w * h.powi(3) / 3.0);
        assert_relative_eq!(m.m11, w * w * h * h / 4.0);
        assert_relative_eq!(m.m30, w.powi(4) * h / 4.0);
        assert_relative_eq!(m.m03, w * h.powi(4) / 4.0);
    }

    #[test]
    fn central_moments_of_offset_rectangle() {
        let (w, h) = (6.0, 3.0);
        let m = ContourMoments::from_contour(&rect(10.0, -5.0, w, h)).expect("non-degenerate");
        let c = m.centroid();
        assert_relative_eq!(c.x, 13.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, -3.5, epsilon = 1e-9);

        let mu = m.central();
        assert_relative_eq!(mu.mu20, w.powi(3) * h / 12.0, epsilon = 1e-6);
        assert_relative_eq!(mu.mu02, w * h.powi(3) / 12.0, epsilon = 1e-6);
        assert!(mu.mu11.abs() < 1e-6);
        // Symmetric shape: odd central moments vanish.
        assert!(mu.mu30.abs() < 1e-4);
        assert!(mu.mu03.abs() < 1e-4);
        assert!(mu.orientation().abs() < 1e-9);
    }

    #[test]
    fn winding_order_does_not_change_moments() {
        let ccw = rect(2.0, 3.0, 5.0, 7.0);
        let mut cw = ccw.clone();
        cw.reverse();
        let a = ContourMoments::from_contour(&ccw).expect("ccw");
        let b = ContourMoments::from_contour(&cw).expect("cw");
        assert_relative_eq!(a.m00, b.m00);
        assert_relative_eq!(a.m10, b.m10);
        assert_relative_eq!(a.m01, b.m01);
        assert_relative_eq!(a.m21, b.m21);
        assert!(a.m00 > 0.0);
    }

    #[test]
    fn triangle_centroid_is_vertex_mean() {
        let tri = [
            Point2::new(0.0, 0.0),
            Point2::new(9.0, 0.0),
            Point2::new(0.0, 6.0),
        ];
        let m = ContourMoments::from_contour(&tri).expect("triangle");
        assert_relative_eq!(m.area(), 27.0);
        let c = m.centroid();
        assert_relative_eq!(c.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_contours_have_no_moments() {
        assert!(ContourMoments::from_contour(&[]).is_none());
        assert!(ContourMoments::from_contour(&[Point2::new(5.0, 5.0)]).is_none());
        assert!(
            ContourMoments::from_contour(&[Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)]).is_none()
        );
        let collinear = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ];
        assert!(ContourMoments::from_contour(&collinear).is_none());
    }
}
