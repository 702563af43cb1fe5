use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::NamedTempFile;

fn fieldnav() -> Command {
    Command::cargo_bin("fieldnav").expect("fieldnav binary")
}

fn json_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("tmp");
    f.write_all(contents.as_bytes()).expect("write");
    f
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("json on stdout")
}

#[test]
fn arc_to_an_offset_target_is_tangent() {
    let v = stdout_json(fieldnav().args(["arc", "--target-x", "40", "--target-y", "20"]));
    assert_eq!(v["case"]["kind"], "tangent");
    assert_eq!(v["target_on_left"], true);
    assert!(v["radius_ft"].as_f64().expect("radius") < 0.0);
}

#[test]
fn arc_accepts_negative_headings() {
    let v = stdout_json(fieldnav().args([
        "arc",
        "--heading",
        "-90",
        "--target-x",
        "0",
        "--target-y",
        "-50",
    ]));
    assert_eq!(v["case"]["kind"], "straight");
    assert_eq!(v["radius_ft"].as_f64().map(f64::abs), Some(1000.0));
}

#[test]
fn arc_params_file_overrides_defaults() {
    let params = json_file(r#"{"recommend_max_arc_length_ft": 1.0}"#);
    let v = stdout_json(
        fieldnav()
            .args(["arc", "--target-x", "40", "--target-y", "20", "--params"])
            .arg(params.path()),
    );
    assert_eq!(v["recommended"], false);
}

#[test]
fn blob_reports_largest_square() {
    let contours = json_file(
        "[[[0,0],[10,0],[10,10],[0,10]], [[100,100],[300,100],[300,300],[100,300]]]",
    );
    let v = stdout_json(
        fieldnav()
            .args(["blob", "--width", "400", "--height", "400", "--contours"])
            .arg(contours.path()),
    );
    assert_eq!(v["found"], true);
    let lr = v["left_right"].as_f64().expect("left_right");
    let tb = v["top_bottom"].as_f64().expect("top_bottom");
    assert!(lr.abs() < 1e-9);
    assert!((tb - 0.5).abs() < 1e-9);
}

#[test]
fn field_fix_at_home_is_the_origin() {
    let v = stdout_json(fieldnav().args([
        "field",
        "--lat",
        "39.485297",
        "--lon",
        "-87.325922",
        "--team",
        "red",
    ]));
    assert!(v["x_ft"].as_f64().expect("x").abs() < 1e-6);
    assert!(v["y_ft"].as_f64().expect("y").abs() < 1e-6);
    assert!(v["heading_deg"].is_null());
}

#[test]
fn team_and_frame_conflict() {
    let frame = json_file("{}");
    fieldnav()
        .args(["field", "--lat", "39.48", "--lon", "-87.32", "--team", "blue", "--frame"])
        .arg(frame.path())
        .assert()
        .failure();
}

#[test]
fn mission_replay_emits_controller_lines() {
    let events = json_file(
        r#"[{"t_ms": 1000, "event": {"type": "stop"}},
            {"t_ms": 0, "event": {"type": "go"}}]"#,
    );
    fieldnav()
        .args(["mission", "--events"])
        .arg(events.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("WHEEL SPEED FORWARD 255 FORWARD 255"))
        .stdout(predicate::str::contains("WHEEL SPEED BRAKE 0 BRAKE 0"))
        .stdout(predicate::str::contains("READY_FOR_MISSION"));
}

#[test]
fn missing_input_fails_with_message() {
    fieldnav()
        .args(["mission", "--events", "/no/such/events.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: failed to read"));
}

#[test]
fn unknown_log_level_is_rejected() {
    fieldnav()
        .args(["--log-level", "loud", "arc", "--target-x", "1", "--target-y", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown log level"));
}
