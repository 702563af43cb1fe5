use std::f64::consts::TAU;

use fieldnav_core::{
    distance, ensure_finite_point, left_turn_delta_deg, right_turn_delta_deg, target_heading_deg,
    InputError, Pose2D,
};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::circle::{circle_contains_target, turn_circle_center, TurnDirection};
use crate::ArcParams;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ArcError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("invalid arc parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}

/// Which branch of the solver produced a solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArcCase {
    /// Target (nearly) on the heading line; even the widest circle misses it.
    Straight,
    /// Target already inside the tightest circle.
    AtTarget,
    /// Tangent circle found by bisection.
    Tangent { iterations: u32, converged: bool },
}

/// Outcome of [`ArcSteeringSolver::solve`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArcSolution {
    /// Signed turn radius in feet: negative turns left, positive turns right.
    pub radius_ft: f64,
    /// Distance to drive along the arc, in feet.
    pub arc_length_ft: f64,
    /// Whether arc steering is a sound strategy for this pose/target pair.
    pub recommended: bool,
    pub target_on_left: bool,
    pub case: ArcCase,
}

impl ArcSolution {
    #[inline]
    pub fn turn_direction(&self) -> TurnDirection {
        TurnDirection::of_radius(self.radius_ft)
    }

    /// `false` only when bisection ran out of iterations.
    pub fn is_exact(&self) -> bool {
        !matches!(
            self.case,
            ArcCase::Tangent {
                converged: false,
                ..
            }
        )
    }
}

/// Tangent-circle steering solver.
///
/// Finds the circle that is tangent to the robot's heading at its current
/// position and passes through the target, then reports its signed radius
/// and the length of the arc from robot to target along it.
#[derive(Clone, Debug, Default)]
pub struct ArcSteeringSolver {
    params: ArcParams,
}

impl ArcSteeringSolver {
    pub fn new(params: ArcParams) -> Result<Self, ArcError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ArcParams {
        &self.params
    }

    /// Solve for the arc from `pose` to `target`.
    ///
    /// Fails only on non-finite input. Geometric corner cases (target dead
    /// ahead, behind, or on top of the robot) produce a regular solution with
    /// the matching [`ArcCase`].
    ///
    /// A target exactly on the robot's position is classified before the
    /// straight-line test, so it comes back as `AtTarget` with
    /// `±min_radius_ft` and zero arc length. Running the straight-line test
    /// first would report `±max_radius_ft` instead.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn solve(&self, pose: Pose2D, target: Point2<f64>) -> Result<ArcSolution, ArcError> {
        pose.validate()?;
        ensure_finite_point("target", target)?;

        let p = &self.params;
        let pose = pose.normalized();

        let heading = pose.heading_deg;
        let target_heading = target_heading_deg(pose.position(), target);
        let left = left_turn_delta_deg(heading, target_heading);
        let right = right_turn_delta_deg(heading, target_heading);

        let mut recommended =
            left < p.recommend_max_turn_deg || right < p.recommend_max_turn_deg;
        let target_on_left = left < right;
        let dir = if target_on_left {
            TurnDirection::Left
        } else {
            TurnDirection::Right
        };

        let dist = distance(pose.position(), target);
        let lower = dir.signed(p.min_radius_ft);
        let upper = dir.signed(p.max_radius_ft);

        let (radius_ft, arc_length_ft, case) = if dist == 0.0
            || circle_contains_target(&pose, lower, target)
        {
            (lower, 0.0, ArcCase::AtTarget)
        } else if !circle_contains_target(&pose, upper, target) {
            let arc = if recommended {
                dist
            } else {
                p.max_arc_length_ft
            };
            (upper, arc, ArcCase::Straight)
        } else {
            let (magnitude, iterations, converged) = self.bisect(&pose, dir, target);
            let radius = dir.signed(magnitude);
            let sweep = sweep_angle_rad(&pose, radius, target);
            (
                radius,
                sweep * magnitude,
                ArcCase::Tangent {
                    iterations,
                    converged,
                },
            )
        };

        if radius_ft.abs() < p.recommend_min_radius_ft
            || arc_length_ft > p.recommend_max_arc_length_ft
        {
            recommended = false;
        }

        debug!(
            "arc solve: left={left:.2} right={right:.2} radius={radius_ft:.3} arc={arc_length_ft:.3} recommended={recommended} case={case:?}"
        );

        Ok(ArcSolution {
            radius_ft,
            arc_length_ft,
            recommended,
            target_on_left,
            case,
        })
    }

    /// Bisection on the radius magnitude. Returns the midpoint of the final
    /// bracket, the number of halvings, and whether the bracket reached the
    /// tolerance.
    fn bisect(&self, pose: &Pose2D, dir: TurnDirection, target: Point2<f64>) -> (f64, u32, bool) {
        let p = &self.params;
        let mut lo = p.min_radius_ft;
        let mut hi = p.max_radius_ft;
        let mut iterations = 0;

        while hi - lo > p.bisection_tolerance_ft && iterations < p.max_bisection_iterations {
            let mid = 0.5 * (lo + hi);
            if circle_contains_target(pose, dir.signed(mid), target) {
                hi = mid;
            } else {
                lo = mid;
            }
            iterations += 1;
        }

        let converged = hi - lo <= p.bisection_tolerance_ft;
        if !converged {
            warn!(
                "arc bisection stopped after {iterations} iterations, bracket still {:.4} ft wide",
                hi - lo
            );
        }
        (0.5 * (lo + hi), iterations, converged)
    }
}

/// Angle (radians, `[0, 2π)`) swept around the turn circle from the robot to
/// the target, travelling in the direction the robot is heading.
///
/// Left turns travel counter-clockwise around the centre and right turns
/// clockwise, so the sweep is a wrapped difference of the two polar angles
/// and never depends on where `atan2` puts its branch cut.
pub fn sweep_angle_rad(pose: &Pose2D, signed_radius: f64, target: Point2<f64>) -> f64 {
    let c = turn_circle_center(pose, signed_radius);
    let robot = (pose.y - c.y).atan2(pose.x - c.x);
    let tgt = (target.y - c.y).atan2(target.x - c.x);
    match TurnDirection::of_radius(signed_radius) {
        TurnDirection::Left => (tgt - robot).rem_euclid(TAU),
        TurnDirection::Right => (robot - tgt).rem_euclid(TAU),
    }
}

/// Solve with default [`ArcParams`].
pub fn solve(pose: Pose2D, target: Point2<f64>) -> Result<ArcSolution, ArcError> {
    ArcSteeringSolver::default().solve(pose, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn solver() -> ArcSteeringSolver {
        ArcSteeringSolver::new(ArcParams::default()).expect("default params")
    }

    #[test]
    fn quarter_circle_left_sweeps_half_turn() {
        // Tangent circle through (0, 100) from the origin facing +X has
        // radius 50 centred on (0, 50): the robot goes half way round.
        let s = solver()
            .solve(Pose2D::new(0.0, 0.0, 0.0), Point2::new(0.0, 100.0))
            .expect("solve");
        assert!(s.target_on_left);
        assert!(s.radius_ft < 0.0);
        assert_abs_diff_eq!(s.radius_ft, -50.0, epsilon = 0.01);
        assert_abs_diff_eq!(s.arc_length_ft, 50.0 * PI, epsilon = 0.05);
        // 157 ft is over the arc-length limit.
        assert!(!s.recommended);
        assert!(matches!(s.case, ArcCase::Tangent { converged: true, .. }));
    }

    #[test]
    fn sweep_crosses_atan2_branch_cut() {
        // Facing -X, the left circle is centred below the robot and the
        // path passes through the negative X axis of that circle.
        let pose = Pose2D::new(0.0, 0.0, 180.0);
        let r = -10.0;
        let c = turn_circle_center(&pose, r);
        assert_abs_diff_eq!(c.y, -10.0, epsilon = 1e-9);
        let k = 10.0 * FRAC_PI_4.cos();
        let target = Point2::new(-k, -10.0 - k);
        assert_abs_diff_eq!(
            sweep_angle_rad(&pose, r, target),
            3.0 * FRAC_PI_4,
            epsilon = 1e-9
        );
    }

    #[test]
    fn right_sweep_is_mirror_of_left() {
        let pose = Pose2D::new(0.0, 0.0, 0.0);
        let left = sweep_angle_rad(&pose, -20.0, Point2::new(20.0, 20.0));
        let right = sweep_angle_rad(&pose, 20.0, Point2::new(20.0, -20.0));
        assert_abs_diff_eq!(left, FRAC_PI_2, epsilon = 1e-9);
        assert_abs_diff_eq!(right, FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn target_on_robot_is_at_target() {
        let s = solver()
            .solve(Pose2D::new(5.0, 5.0, 30.0), Point2::new(5.0, 5.0))
            .expect("solve");
        assert_eq!(s.case, ArcCase::AtTarget);
        assert_eq!(s.radius_ft.abs(), ArcParams::default().min_radius_ft);
        assert_eq!(s.arc_length_ft, 0.0);
        assert!(!s.recommended);
    }

    #[test]
    fn iteration_cap_returns_best_effort() {
        let params = ArcParams {
            max_bisection_iterations: 3,
            ..ArcParams::default()
        };
        let s = ArcSteeringSolver::new(params)
            .expect("params")
            .solve(Pose2D::new(0.0, 0.0, 0.0), Point2::new(0.0, 100.0))
            .expect("solve");
        assert_eq!(
            s.case,
            ArcCase::Tangent {
                iterations: 3,
                converged: false
            }
        );
        assert!(!s.is_exact());
        assert!(s.radius_ft < 0.0 && s.radius_ft.is_finite());
    }

    #[test]
    fn heading_is_normalized_before_use() {
        let a = solver()
            .solve(Pose2D::new(0.0, 0.0, 0.0), Point2::new(10.0, 17.0))
            .expect("solve");
        let b = solver()
            .solve(Pose2D::new(0.0, 0.0, 720.0), Point2::new(10.0, 17.0))
            .expect("solve");
        assert_abs_diff_eq!(a.radius_ft, b.radius_ft, epsilon = 1e-9);
        assert_abs_diff_eq!(a.arc_length_ft, b.arc_length_ft, epsilon = 1e-9);
    }

    #[test]
    fn invalid_params_are_rejected_at_construction() {
        let params = ArcParams {
            bisection_tolerance_ft: 0.0,
            ..ArcParams::default()
        };
        assert!(matches!(
            ArcSteeringSolver::new(params),
            Err(ArcError::InvalidParam {
                name: "bisection_tolerance_ft",
                ..
            })
        ));
    }
}
