use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flute_cli"))
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("flute_cli_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn replay_fixture_succeeds() {
    let output = cli()
        .args(["replay", "--fixture", "scale_step_g4"])
        .output()
        .expect("failed to run flute_cli replay");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("replay report JSON payload");
    assert_eq!(json["fixture"], "scale_step_g4");
    assert_eq!(json["frame_count"], 14);
    let last = &json["frames"][13];
    assert_eq!(last["note"], "G4");
    assert_eq!(last["playing"], true);
    assert!(json["event_count"].as_u64().unwrap_or_default() >= 3);
}

#[test]
fn replay_detects_mismatch() {
    let dir = scratch("mismatch");
    let script = dir.join("wrong_note.json");
    std::fs::write(
        &script,
        r#"{
            "name": "wrong_note",
            "frames": [ { "t_ms": 500, "pose": { "left": [0,0,0,0], "right": [0,0,0,0] } } ],
            "expect": [ { "t_ms": 500, "note": "A4", "playing": true } ]
        }"#,
    )
    .expect("write script");

    let output = cli()
        .args(["replay", "--fixture", script.to_str().expect("utf-8 path")])
        .output()
        .expect("failed to run mismatch replay");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("\"failures\""),
        "expected diff JSON in stderr, got {stderr}"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_writes_output_file() {
    let dir = scratch("output");
    let out = dir.join("report.json");
    let output = cli()
        .args([
            "replay",
            "--fixture",
            "hands_lost_and_return",
            "--output",
            out.to_str().expect("utf-8 path"),
        ])
        .output()
        .expect("failed to run replay with output");
    assert!(output.status.success());

    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&out).expect("report written"))
            .expect("report JSON");
    assert_eq!(json["frames"][6]["outcome"]["outcome"], "hands_lost");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unknown_fixture_fails() {
    let output = cli()
        .args(["replay", "--fixture", "does_not_exist"])
        .output()
        .expect("failed to run replay");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn list_fixtures_shows_bundled_scripts() {
    let output = cli()
        .arg("list-fixtures")
        .output()
        .expect("failed to run list-fixtures");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(
        stdout.contains("c4_hold"),
        "expected fixture listing, got {stdout}"
    );
}

#[test]
fn generate_notes_writes_every_note() {
    let dir = scratch("notes");
    let output = cli()
        .args([
            "generate-notes",
            "--out-dir",
            dir.to_str().expect("utf-8 path"),
            "--sample-rate",
            "8000",
            "--duration-ms",
            "50",
        ])
        .output()
        .expect("failed to run generate-notes");
    assert!(output.status.success());

    for note in ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"] {
        assert!(dir.join(format!("{note}.wav")).is_file(), "{note}.wav missing");
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn fingerings_prints_table() {
    let output = cli()
        .arg("fingerings")
        .output()
        .expect("failed to run fingerings");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.contains("C4    00000000"), "got {stdout}");
    assert!(stdout.contains("C5    01111111"), "got {stdout}");
}

#[test]
fn dump_config_reports_defaults() {
    let output = cli()
        .arg("dump-config")
        .output()
        .expect("failed to run dump-config");
    assert!(output.status.success());
    let json: Value =
        serde_json::from_slice(&output.stdout).expect("config JSON payload");
    assert_eq!(json["smoothing"]["window_size"], 10);
    assert_eq!(json["classifier"]["min_match_score"], 7);
    assert_eq!(json["playback"]["note_change_debounce_ms"], 500);
}
