use std::process::{Command, Output};

fn trip_telemetry(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trip-telemetry"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run trip-telemetry")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

const SEEDED_DRIVE: [&str; 7] = [
    "drive",
    "--seed",
    "7",
    "--max-ticks",
    "5",
    "--speed-limit",
    "85",
];

#[test]
fn seeded_drive_prints_one_status_line_per_tick() {
    let output = trip_telemetry(&SEEDED_DRIVE);
    assert!(output.status.success(), "drive failed: {output:?}");

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.iter().filter(|line| line.starts_with('[')).count(), 5);
    assert!(lines[0].starts_with("[00:00:01]"));
    assert!(lines[0].contains("next stop Victoria Island (1004)"));
    assert!(lines[4].ends_with("0% complete"));
    assert_eq!(lines[5], "== route ended after CMS Terminal");
    assert_eq!(
        lines[6],
        "route ended early after 5 ticks (00:00:05), 0 speed alert(s)"
    );
}

#[test]
fn seeded_drive_replays_identically() {
    let first = trip_telemetry(&SEEDED_DRIVE);
    let second = trip_telemetry(&SEEDED_DRIVE);
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn route_command_lists_sample_route() {
    let output = trip_telemetry(&["route"]);
    assert!(output.status.success(), "route failed: {output:?}");

    let text = stdout(&output);
    assert!(text.starts_with("CMS - Lekki (6 waypoints, 12.0 km)\n"));
    assert!(text.contains("  12.0 km  stop      Lekki Phase 1 (Destination)"));
}

#[test]
fn missing_config_file_fails_with_its_path() {
    let output = trip_telemetry(&["drive", "--config", "/nonexistent/session.toml"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).expect("utf8 stderr");
    assert!(stderr.contains("/nonexistent/session.toml"), "stderr: {stderr}");
}
