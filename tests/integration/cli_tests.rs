//! Integration tests for the CLI binary.
//!
//! Verifies that the `creg` binary responds to basic flags and drives a
//! small registry end to end inside a temporary `CREG_HOME`.
//!
//! This test is registered as a [[test]] in the citizen-registry-cli crate
//! so that CARGO_BIN_EXE_creg is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `creg` binary.
fn creg_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_creg"))
}

fn creg(home: &Path, args: &[&str]) -> Output {
    creg_binary()
        .env("CREG_HOME", home)
        .args(args)
        .output()
        .expect("failed to execute creg")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "creg should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_responds_to_help() {
    let output = creg_binary()
        .arg("--help")
        .output()
        .expect("failed to execute creg --help");

    assert_ok(&output);
    let stdout = stdout(&output);
    assert!(
        stdout.contains("creg") || stdout.contains("Usage"),
        "creg --help output should contain usage information, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = creg_binary()
        .arg("--version")
        .output()
        .expect("failed to execute creg --version");

    assert_ok(&output);
    assert!(stdout(&output).contains("0.1"));
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = creg_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute creg");

    assert!(
        !output.status.success(),
        "creg with unknown flag should exit with error"
    );
}

#[test]
fn cli_rejects_malformed_caller() {
    let home = tempfile::tempdir().unwrap();
    let output = creg(home.path(), &["--as", "superuser", "stats"]);
    assert!(!output.status.success());
}

#[test]
fn cli_stage_register_grant_flow() {
    let home = tempfile::tempdir().unwrap();
    let h = home.path();

    assert_ok(&creg(
        h,
        &["--as", "admin", "agency", "register", "--name", "LHDN", "--secret", "pw"],
    ));

    // Stage a draft for an unregistered citizen.
    let profile = h.join("profile.json");
    std::fs::write(
        &profile,
        r#"{ "fullName": "Draft Name", "incomeAmount": 4500 }"#,
    )
    .unwrap();
    let out = creg(
        h,
        &[
            "--as", "agency:1", "--auth", "pw", "submit", "--citizen", "C1", "--file",
            profile.to_str().unwrap(),
        ],
    );
    assert_ok(&out);
    assert!(stdout(&out).contains("Staged draft 1"));

    // Register; the draft migrates to version 2.
    let out = creg(
        h,
        &["citizen", "register", "--id", "C1", "--name", "Aisyah", "--dob", "1990-01-01", "--secret", "citizen-pw"],
    );
    assert_ok(&out);
    assert!(stdout(&out).contains("draft 1 -> version 2"));

    let me = ["--as", "citizen:C1", "--auth", "citizen-pw"];
    let out = creg(h, &[&me[..], &["citizen", "versions", "--id", "C1"][..]].concat());
    assert_ok(&out);
    assert_eq!(stdout(&out).trim(), "1 2");

    // The agency cannot read until granted.
    let out = creg(h, &["--as", "agency:1", "--auth", "pw", "citizen", "show", "--id", "C1"]);
    assert!(!out.status.success());

    assert_ok(&creg(
        h,
        &[&me[..], &["grant", "--citizen", "C1", "--agency", "1"][..]].concat(),
    ));
    let out = creg(h, &["--as", "agency:1", "--auth", "pw", "citizen", "show", "--id", "C1"]);
    assert_ok(&out);
    let shown: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(shown["fullName"], "Draft Name");
    assert_eq!(shown["incomeAmount"], 4500);

    let out = creg(h, &["login", "citizen", "--id", "C1", "--secret", "citizen-pw"]);
    assert_ok(&out);
    assert_eq!(stdout(&out).trim(), "citizen:C1");

    let out = creg(h, &["stats"]);
    assert_ok(&out);
    assert!(stdout(&out).contains("Citizens:       1"));
}

#[test]
fn cli_as_requires_matching_secret() {
    let home = tempfile::tempdir().unwrap();
    let h = home.path();
    assert_ok(&creg(
        h,
        &["citizen", "register", "--id", "C1", "--name", "Aisyah", "--secret", "citizen-pw"],
    ));

    let versions = ["citizen", "versions", "--id", "C1"];
    assert!(!creg(h, &[&["--as", "citizen:C1"][..], &versions[..]].concat())
        .status
        .success());
    assert!(!creg(h, &[&["--as", "citizen:C1", "--auth", "wrong"][..], &versions[..]].concat())
        .status
        .success());
    assert_ok(&creg(
        h,
        &[&["--as", "citizen:C1", "--auth", "citizen-pw"][..], &versions[..]].concat(),
    ));

    // Registering again as someone else's identity is checked too.
    let out = creg(
        h,
        &["--as", "agency:1", "--auth", "pw", "citizen", "register", "--id", "C2", "--name", "X", "--secret", "s"],
    );
    assert!(!out.status.success());
}

#[test]
fn cli_configured_admin_must_authenticate() {
    let home = tempfile::tempdir().unwrap();
    let h = home.path();
    assert_ok(&creg(h, &["config", "set-admin", "--secret", "root-pw"]));

    let register = ["agency", "register", "--name", "LHDN", "--secret", "pw"];
    assert!(!creg(h, &[&["--as", "admin", "--auth", "wrong"][..], &register[..]].concat())
        .status
        .success());
    assert_ok(&creg(
        h,
        &[&["--as", "admin", "--auth", "root-pw"][..], &register[..]].concat(),
    ));

    // Once set, only the administrator may change the configuration.
    assert!(!creg(h, &["config", "set-limit", "--max-versions", "5"])
        .status
        .success());
    assert!(!creg(h, &["config", "set-admin", "--secret", "stolen"])
        .status
        .success());
    assert_ok(&creg(
        h,
        &["--as", "admin", "--auth", "root-pw", "config", "set-limit", "--max-versions", "5"],
    ));

    let out = creg(h, &["login", "admin", "--secret", "root-pw"]);
    assert_ok(&out);
    assert_eq!(stdout(&out).trim(), "admin");
}
