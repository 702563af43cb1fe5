use serde::{Deserialize, Serialize};

use crate::ArcError;

/// Tunables for the arc-radius strategy. All lengths in feet, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcParams {
    /// Smallest radius searched. Closer than this and the robot is at the target.
    pub min_radius_ft: f64,
    /// Largest radius searched. Arcs this wide are treated as straight lines.
    pub max_radius_ft: f64,
    /// Turns of this many degrees or more are better served by a point turn.
    pub recommend_max_turn_deg: f64,
    /// Longest arc worth driving before another strategy is preferred.
    pub recommend_max_arc_length_ft: f64,
    /// Radii below this mean "stop, you are there".
    pub recommend_min_radius_ft: f64,
    /// Arc length reported when pointing straight away from the target.
    pub max_arc_length_ft: f64,
    /// Bisection stops once the radius bracket is this narrow.
    pub bisection_tolerance_ft: f64,
    /// Hard cap on bisection steps.
    pub max_bisection_iterations: u32,
}

impl Default for ArcParams {
    fn default() -> Self {
        Self {
            min_radius_ft: 1.0,
            max_radius_ft: 1000.0,
            recommend_max_turn_deg: 90.0,
            recommend_max_arc_length_ft: 150.0,
            recommend_min_radius_ft: 2.0,
            max_arc_length_ft: 1000.0,
            bisection_tolerance_ft: 0.01,
            max_bisection_iterations: 100,
        }
    }
}

impl ArcParams {
    pub fn validate(&self) -> Result<(), ArcError> {
        let positive = |name: &'static str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ArcError::InvalidParam {
                    name,
                    reason: format!("must be finite and > 0 (got {v})"),
                })
            }
        };
        positive("min_radius_ft", self.min_radius_ft)?;
        positive("max_radius_ft", self.max_radius_ft)?;
        positive("recommend_max_turn_deg", self.recommend_max_turn_deg)?;
        positive("recommend_max_arc_length_ft", self.recommend_max_arc_length_ft)?;
        positive("recommend_min_radius_ft", self.recommend_min_radius_ft)?;
        positive("max_arc_length_ft", self.max_arc_length_ft)?;
        positive("bisection_tolerance_ft", self.bisection_tolerance_ft)?;

        if self.min_radius_ft >= self.max_radius_ft {
            return Err(ArcError::InvalidParam {
                name: "max_radius_ft",
                reason: format!(
                    "must exceed min_radius_ft ({} >= {})",
                    self.min_radius_ft, self.max_radius_ft
                ),
            });
        }
        if self.max_bisection_iterations == 0 {
            return Err(ArcError::InvalidParam {
                name: "max_bisection_iterations",
                reason: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}
