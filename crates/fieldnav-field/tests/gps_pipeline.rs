use approx::assert_abs_diff_eq;
use fieldnav_field::{
    FieldFrame, FieldOrientation, HeadingSource, PoseTracker, Team, TrackerParams,
    FEET_PER_METER,
};

/// Drive from red home toward blue home, reporting course over ground, and
/// check that the tracker ends up where the fixes say with the compass
/// re-anchored to the GPS course.
#[test]
fn drive_down_the_field() {
    let frame = FieldFrame::for_team(Team::Red);
    let bearing = frame.field_bearing_deg();
    let mut tracker = PoseTracker::new(
        TrackerParams::default(),
        FieldOrientation::from_frame(&frame),
    );

    // Compass is 12° off.
    tracker.on_azimuth(bearing + 12.0).expect("azimuth");
    assert_abs_diff_eq!(tracker.pose().heading_deg, -12.0, epsilon = 1e-9);

    tracker.set_motion(true, true);
    let mut last = None;
    for k in 1..=5 {
        let geo = frame.origin.destination(bearing, 3.0 * k as f64);
        let fix = frame.to_field(geo, Some(bearing)).expect("fix");
        last = Some(tracker.on_fix(fix).expect("update"));
    }

    let update = last.expect("update");
    assert_eq!(update.recalibrated, Some(HeadingSource::Gps));

    let pose = tracker.pose();
    assert_abs_diff_eq!(pose.x, 15.0 * FEET_PER_METER, epsilon = 1e-3);
    assert_abs_diff_eq!(pose.y, 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(pose.heading_deg, 0.0, epsilon = 1e-6);

    // Moving away from the origin each time after the first fix.
    assert_eq!(update.getting_farther_away, 4);
}

#[test]
fn dead_reckoning_between_fixes_follows_sensor_heading() {
    let frame = FieldFrame::for_team(Team::Blue);
    let mut tracker = PoseTracker::new(
        TrackerParams::default(),
        FieldOrientation::from_frame(&frame),
    );
    tracker.on_azimuth(frame.field_bearing_deg()).expect("azimuth");
    tracker.set_motion(true, false);

    // One second of ticks at 3.3 ft/s.
    for _ in 0..10 {
        tracker.tick();
    }
    let pose = tracker.pose();
    assert_abs_diff_eq!(pose.x, 3.3, epsilon = 1e-9);
    assert_abs_diff_eq!(pose.y, 0.0, epsilon = 1e-9);
}
