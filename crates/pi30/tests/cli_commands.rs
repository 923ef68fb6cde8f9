#![cfg(all(unix, feature = "cli"))]

use std::process::{Command, Output};

const MISSING_PORT: &str = "/dev/pi30-cli-test-missing";

fn pi30(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pi30"))
        .env_remove("PI30_PORT")
        .env_remove("PI30_ATTEMPTS")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("pi30 should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn frame_prints_wire_bytes_as_json() {
    let output = pi30(&["--format", "json", "frame", "QPIGS"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(r#""frame":"51 50 49 47 53 B7 A9 0D""#), "{out}");
    assert!(out.contains(r#""checksum":"B7 A9""#));
    assert!(out.contains(r#""length":8"#));
    assert!(out.contains(r#""command":"QPIGS""#));
}

#[test]
fn frame_pretty_shows_adjusted_checksum() {
    // Raw CRC of POP02 ends in 0x0A; the firmware bumps it to 0x0B.
    let output = pi30(&["--format", "pretty", "frame", "POP02"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("E2 0B"), "{out}");
    assert!(out.lines().any(|l| l.starts_with("command") && l.ends_with("POP02")));
}

#[test]
fn frame_rejects_empty_command_with_usage_code() {
    let output = pi30(&["frame", ""]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid command"));
}

#[test]
fn verify_accepts_valid_reply() {
    let output = pi30(&["--format", "json", "verify", "28 42 E7 C9 0D"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains(r#""payload":"B""#), "{out}");
    assert!(out.contains(r#""checksum":"E7 C9""#));
}

#[test]
fn verify_classifies_bad_frames_as_invalid_data() {
    let mismatch = pi30(&["verify", "28 42 00 00 0D"]);
    assert_eq!(mismatch.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&mismatch.stderr).contains("checksum mismatch"));

    let short = pi30(&["verify", "28 42 0D"]);
    assert_eq!(short.status.code(), Some(60));
}

#[test]
fn verify_rejects_malformed_hex() {
    let output = pi30(&["verify", "28 4"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = pi30(&["version"]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("pi30 {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended_lists_build_details() {
    let output = pi30(&["version", "--extended"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("name: pi30"));
    assert!(out.contains("target_os:"));
}

#[test]
fn missing_port_exits_with_transport_code() {
    let output = pi30(&["--port", MISSING_PORT, "mode"]);

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(MISSING_PORT), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn port_can_come_from_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_pi30"))
        .env("PI30_PORT", MISSING_PORT)
        .args(["--log-level", "error", "status"])
        .output()
        .expect("pi30 should run");

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains(MISSING_PORT));
}

#[test]
fn out_of_range_setter_fails_before_opening_port() {
    let output = pi30(&["--port", MISSING_PORT, "set-output", "7"]);

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must be below 5"), "{stderr}");
    assert!(!stderr.contains(MISSING_PORT));
}

#[test]
fn raw_rejects_command_with_terminator() {
    let output = pi30(&["--port", MISSING_PORT, "raw", "QMOD\r"]);
    assert_eq!(output.status.code(), Some(64));
}
