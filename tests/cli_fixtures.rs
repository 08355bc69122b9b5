use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_emotion_cli"))
}

fn fixture_file(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn classify_fixture_succeeds() {
    let output = cli()
        .args(["classify", "--fixture", "happy_hold"])
        .output()
        .expect("failed to run emotion_cli classify");
    assert!(
        output.status.success(),
        "CLI exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("classification report JSON");
    assert_eq!(json["fixture"], "happy_hold");
    assert_eq!(json["frame_count"], 188);
    assert_eq!(json["calibrated_at"], 127);
    assert_eq!(json["final_emotion"], "Happy");
}

#[test]
fn every_bundled_fixture_meets_expectations() {
    for fixture in [
        "calibrate_neutral",
        "happy_hold",
        "blink_during_happy",
        "talking_jaw",
        "surprise_face",
    ] {
        let output = cli()
            .args(["classify", "--fixture", fixture])
            .output()
            .expect("failed to run emotion_cli classify");
        assert_eq!(
            output.status.code(),
            Some(0),
            "{fixture} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

#[test]
fn classify_fixture_detects_mismatch() {
    let output = cli()
        .args([
            "classify",
            "--fixture",
            "happy_hold",
            "--expect",
            &fixture_file("happy_hold_incorrect.expect.json"),
        ])
        .output()
        .expect("failed to run mismatch classify");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("\"failures\""),
        "expected diff JSON in stderr, got {stderr}"
    );
}

#[test]
fn classify_unknown_fixture_is_an_error() {
    let output = cli()
        .args(["classify", "--fixture", "no_such_fixture"])
        .output()
        .expect("failed to run classify");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn classify_writes_report_to_output_file() {
    let path = std::env::temp_dir().join(format!("emotion_cli_report_{}.json", std::process::id()));
    let output = cli()
        .args(["classify", "--fixture", "surprise_face", "--output"])
        .arg(&path)
        .output()
        .expect("failed to run classify with output");
    assert!(output.status.success());

    let report = std::fs::read_to_string(&path).expect("report written");
    let json: Value = serde_json::from_str(&report).expect("report JSON");
    assert_eq!(json["final_emotion"], "Surprised");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn stream_changes_only_lists_switches() {
    let output = cli()
        .args(["stream", "--fixture", "happy_hold", "--changes-only"])
        .output()
        .expect("failed to run stream");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("JSON line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["frame_index"], 127);
    assert_eq!(lines[0]["outcome"]["kind"], "calibration_complete");
    assert_eq!(lines[1]["frame_index"], 134);
    assert_eq!(lines[1]["switched"]["to"], "Happy");
}

#[test]
fn dump_fixtures_lists_assets() {
    let output = cli()
        .arg("dump-fixtures")
        .output()
        .expect("failed to run dump-fixtures");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(
        stdout.contains("happy_hold"),
        "expected fixture listing, got {stdout}"
    );
    assert!(!stdout.lines().any(|line| line.starts_with("happy_hold_incorrect")));
}

#[test]
fn print_config_emits_defaults() {
    let output = cli()
        .arg("print-config")
        .output()
        .expect("failed to run print-config");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("config JSON");
    assert_eq!(json["hysteresis"]["switch_hold_frames"], 6);
    assert_eq!(json["hysteresis"]["switch_cooldown_frames"], 10);
}
