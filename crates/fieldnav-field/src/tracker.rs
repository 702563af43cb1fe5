use fieldnav_core::{
    distance, ensure_finite, ensure_finite_point, normalize_angle_deg, target_heading_deg, Point2D,
    Pose2D,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{FieldError, FieldFix, FieldOrientation};

/// Dead-reckoning and heading-recalibration settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Assumed ground speed while both wheels drive forward.
    pub speed_ft_per_sec: f64,
    /// Period of [`PoseTracker::tick`].
    pub loop_interval_ms: u64,
    /// Calculated headings that must agree before they are trusted.
    pub trust_count: usize,
    /// Maximum spread, in degrees, among trusted calculated headings.
    pub trust_angle_deg: f64,
    /// Distance assumed for the fix before the first one, so the first real
    /// fix never counts as moving away.
    pub initial_distance_ft: f64,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            speed_ft_per_sec: 3.3,
            loop_interval_ms: 100,
            trust_count: 3,
            trust_angle_deg: 15.0,
            initial_distance_ft: 1000.0,
        }
    }
}

impl TrackerParams {
    /// Feet travelled per tick at the assumed speed.
    pub fn step_ft(&self) -> f64 {
        self.speed_ft_per_sec * self.loop_interval_ms as f64 / 1000.0
    }
}

/// Where a heading recalibration came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingSource {
    /// Receiver course over ground.
    Gps,
    /// Direction between the two latest fixes.
    Calculated,
}

/// One stored GPS fix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    pub x_ft: f64,
    pub y_ft: f64,
    pub heading_deg: Option<f64>,
    pub distance_ft: f64,
    pub calculated_heading_deg: Option<f64>,
}

/// What [`PoseTracker::on_fix`] concluded from a fix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixUpdate {
    pub distance_ft: f64,
    pub getting_farther_away: u32,
    pub calculated_heading_deg: Option<f64>,
    pub recalibrated: Option<HeadingSource>,
}

/// Fuses GPS fixes, compass headings and wheel state into a pose estimate.
///
/// Between fixes the position is dead-reckoned along the sensor heading; each
/// fix snaps the estimate back to the measured position. While the robot
/// drives straight, GPS course (or, failing that, a consistent run of
/// headings calculated from consecutive fixes) re-anchors the compass.
#[derive(Clone, Debug)]
pub struct PoseTracker {
    params: TrackerParams,
    orientation: FieldOrientation,
    reference: Point2D,
    guess: Point2D,
    sensor_heading_deg: f64,
    moving_forward: bool,
    moving_straight: bool,
    getting_farther_away: u32,
    /// Newest last; holds at most `trust_count + 1` samples.
    history: Vec<GpsSample>,
    fixes_seen: u64,
}

impl PoseTracker {
    pub fn new(params: TrackerParams, orientation: FieldOrientation) -> Self {
        Self {
            params,
            orientation,
            reference: Point2D::origin(),
            guess: Point2D::origin(),
            sensor_heading_deg: orientation.field_heading_deg(),
            moving_forward: false,
            moving_straight: false,
            getting_farther_away: 0,
            history: Vec::new(),
            fixes_seen: 0,
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn orientation(&self) -> &FieldOrientation {
        &self.orientation
    }

    /// Best current pose estimate.
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.guess.x, self.guess.y, self.sensor_heading_deg)
    }

    /// The most recent fixes, oldest first. Only as many are kept as the
    /// calculated-heading check reads.
    pub fn history(&self) -> &[GpsSample] {
        &self.history
    }

    /// Fixes accepted since construction.
    pub fn fixes_seen(&self) -> u64 {
        self.fixes_seen
    }

    pub fn getting_farther_away(&self) -> u32 {
        self.getting_farther_away
    }

    /// Point that "getting farther away" is measured against. Defaults to the
    /// field origin.
    pub fn set_reference(&mut self, reference: Point2D) -> Result<(), FieldError> {
        ensure_finite_point("reference", reference)?;
        self.reference = reference;
        Ok(())
    }

    /// Update the motion flags from the latest wheel command.
    pub fn set_motion(&mut self, moving_forward: bool, moving_straight: bool) {
        self.moving_forward = moving_forward;
        self.moving_straight = moving_straight;
    }

    /// Feed a compass azimuth; returns the resulting field heading.
    pub fn on_azimuth(&mut self, azimuth_deg: f64) -> Result<f64, FieldError> {
        ensure_finite("azimuth_deg", azimuth_deg)?;
        self.sensor_heading_deg = self.orientation.update_azimuth(azimuth_deg);
        Ok(self.sensor_heading_deg)
    }

    /// Advance the dead-reckoned position by one loop period.
    pub fn tick(&mut self) {
        if !self.moving_forward {
            return;
        }
        let step = self.params.step_ft();
        let (s, c) = self.sensor_heading_deg.to_radians().sin_cos();
        self.guess.x += step * c;
        self.guess.y += step * s;
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn on_fix(&mut self, fix: FieldFix) -> Result<FixUpdate, FieldError> {
        let position = Point2D::new(fix.x_ft, fix.y_ft);
        ensure_finite_point("fix", position)?;
        let heading = match fix.heading_deg {
            Some(h) => Some(normalize_angle_deg(ensure_finite("fix.heading_deg", h)?)),
            None => None,
        };

        self.guess = position;

        let distance_ft = distance(position, self.reference);
        let old_distance = self
            .history
            .last()
            .map_or(self.params.initial_distance_ft, |s| s.distance_ft);
        if distance_ft > old_distance {
            self.getting_farther_away += 1;
        } else if distance_ft < old_distance {
            self.getting_farther_away = 0;
        }

        let calculated = self
            .history
            .last()
            .map(|s| target_heading_deg(Point2D::new(s.x_ft, s.y_ft), position));

        let mut recalibrated = None;
        if self.moving_straight {
            if let Some(h) = heading {
                self.recalibrate(h);
                recalibrated = Some(HeadingSource::Gps);
            } else if let Some(c) = calculated.filter(|&c| self.calculated_is_trusted(c)) {
                self.recalibrate(c);
                recalibrated = Some(HeadingSource::Calculated);
            }
        }

        self.history.push(GpsSample {
            x_ft: fix.x_ft,
            y_ft: fix.y_ft,
            heading_deg: heading,
            distance_ft,
            calculated_heading_deg: calculated,
        });
        let keep = self.params.trust_count + 1;
        if self.history.len() > keep {
            let excess = self.history.len() - keep;
            self.history.drain(..excess);
        }
        self.fixes_seen += 1;

        debug!(
            "fix #{}: ({:.1}, {:.1}) ft, distance {:.1}, farther x{}",
            self.fixes_seen,
            fix.x_ft,
            fix.y_ft,
            distance_ft,
            self.getting_farther_away
        );

        Ok(FixUpdate {
            distance_ft,
            getting_farther_away: self.getting_farther_away,
            calculated_heading_deg: calculated,
            recalibrated,
        })
    }

    /// Needs more than `trust_count` stored fixes, and the last `trust_count`
    /// calculated headings must all exist and sit within `trust_angle_deg`
    /// of `current`.
    fn calculated_is_trusted(&self, current: f64) -> bool {
        let n = self.params.trust_count;
        if self.history.len() <= n {
            return false;
        }
        self.history[self.history.len() - n..].iter().all(|s| {
            s.calculated_heading_deg.is_some_and(|old| {
                normalize_angle_deg(current - old).abs() <= self.params.trust_angle_deg
            })
        })
    }

    fn recalibrate(&mut self, heading_deg: f64) {
        info!(
            "heading recalibrated {:.1} -> {:.1}",
            self.sensor_heading_deg, heading_deg
        );
        self.orientation.set_current_field_heading(heading_deg);
        self.sensor_heading_deg = self.orientation.field_heading_deg();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tracker() -> PoseTracker {
        PoseTracker::new(TrackerParams::default(), FieldOrientation::new(0.0))
    }

    fn fix(x: f64, y: f64, heading: Option<f64>) -> FieldFix {
        FieldFix {
            x_ft: x,
            y_ft: y,
            heading_deg: heading,
        }
    }

    #[test]
    fn dead_reckoning_only_while_moving_forward() {
        let mut t = tracker();
        t.on_azimuth(-90.0).expect("azimuth"); // field heading +90
        t.tick();
        assert_eq!(t.pose().position(), Point2D::origin());

        t.set_motion(true, false);
        for _ in 0..10 {
            t.tick();
        }
        let p = t.pose();
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 3.3, epsilon = 1e-9);
    }

    #[test]
    fn fix_resets_guess() {
        let mut t = tracker();
        t.set_motion(true, false);
        t.tick();
        t.on_fix(fix(40.0, -2.0, None)).expect("fix");
        assert_eq!(t.pose().position(), Point2D::new(40.0, -2.0));
    }

    #[test]
    fn farther_away_counter() {
        let mut t = tracker();
        assert_eq!(t.on_fix(fix(100.0, 0.0, None)).unwrap().getting_farther_away, 0);
        assert_eq!(t.on_fix(fix(110.0, 0.0, None)).unwrap().getting_farther_away, 1);
        assert_eq!(t.on_fix(fix(120.0, 0.0, None)).unwrap().getting_farther_away, 2);
        // Equal distance leaves the counter alone.
        assert_eq!(t.on_fix(fix(0.0, 120.0, None)).unwrap().getting_farther_away, 2);
        assert_eq!(t.on_fix(fix(0.0, 60.0, None)).unwrap().getting_farther_away, 0);
    }

    #[test]
    fn gps_heading_recalibrates_only_when_straight() {
        let mut t = tracker();
        t.on_azimuth(0.0).expect("azimuth");

        let u = t.on_fix(fix(0.0, 0.0, Some(30.0))).expect("fix");
        assert_eq!(u.recalibrated, None);
        assert_abs_diff_eq!(t.pose().heading_deg, 0.0);

        t.set_motion(true, true);
        let u = t.on_fix(fix(1.0, 0.0, Some(30.0))).expect("fix");
        assert_eq!(u.recalibrated, Some(HeadingSource::Gps));
        assert_abs_diff_eq!(t.pose().heading_deg, 30.0);
        // The compass offset persists.
        assert_abs_diff_eq!(t.on_azimuth(-10.0).expect("azimuth"), 40.0);
    }

    #[test]
    fn calculated_heading_needs_agreeing_history() {
        let mut t = tracker();
        t.set_motion(true, true);
        let mut last = None;
        for k in 0..5 {
            let s = k as f64 * 10.0;
            last = Some(t.on_fix(fix(s, s, None)).expect("fix"));
            if k < 4 {
                assert_eq!(last.unwrap().recalibrated, None, "fix {k}");
            }
        }
        let u = last.expect("update");
        assert_eq!(u.recalibrated, Some(HeadingSource::Calculated));
        assert_abs_diff_eq!(t.pose().heading_deg, 45.0, epsilon = 1e-9);
    }

    #[test]
    fn history_is_bounded_by_the_trust_window() {
        let mut t = tracker();
        t.set_motion(true, true);
        for k in 0..50 {
            let s = k as f64;
            t.on_fix(fix(s, s, None)).expect("fix");
        }
        assert_eq!(t.fixes_seen(), 50);
        assert_eq!(t.history().len(), t.params().trust_count + 1);
        assert_abs_diff_eq!(t.history().last().expect("newest").x_ft, 49.0);

        // Trimming keeps enough samples for the calculated heading to be trusted.
        let u = t.on_fix(fix(50.0, 50.0, None)).expect("fix");
        assert_eq!(u.recalibrated, Some(HeadingSource::Calculated));
    }

    #[test]
    fn erratic_calculated_headings_are_ignored() {
        let mut t = tracker();
        t.set_motion(true, true);
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (20.0, 10.0), (20.0, 20.0)] {
            let u = t.on_fix(fix(x, y, None)).expect("fix");
            assert_eq!(u.recalibrated, None);
        }
    }

    #[test]
    fn non_finite_fix_is_rejected() {
        let mut t = tracker();
        assert!(t.on_fix(fix(f64::NAN, 0.0, None)).is_err());
        assert!(t.on_fix(fix(0.0, 0.0, Some(f64::INFINITY))).is_err());
        assert!(t.history().is_empty());
    }
}
