//! Smoke tests for the `serial-lines` binary.
use std::process::Command;

fn command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_serial-lines"));
    cmd.env_remove("SERIAL_LINES_CONFIG");
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn help_lists_options() {
    let output = command().arg("--help").output().expect("run serial-lines");
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("--baud"));
    assert!(help.contains("--list"));
}

#[test]
fn port_is_required() {
    let output = command().output().expect("run serial-lines");
    assert!(!output.status.success());
}

#[test]
fn missing_device_fails_cleanly() {
    let output = command()
        .args(["/dev/nonexistent_port_12345", "--baud", "9600"])
        .output()
        .expect("run serial-lines");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "unexpected panic: {stderr}");
}

#[test]
fn bad_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[serial\n").unwrap();

    let output = command()
        .arg("--config")
        .arg(&path)
        .arg("--list")
        .output()
        .expect("run serial-lines");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("parse"));
}
