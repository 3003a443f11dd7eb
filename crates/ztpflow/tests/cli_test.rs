//! Integration tests for the `ztpflow` CLI binary.
//!
//! These cover argument parsing, offline commands (validate, render,
//! option43), and error handling — no controller required.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `ztpflow` binary with env isolation.
///
/// Clears `ZTP_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn ztp_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ztpflow");
    cmd.env("HOME", "/tmp/ztpflow-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ztpflow-cli-test-nonexistent")
        .env_remove("ZTP_PROFILE")
        .env_remove("ZTP_CONTROLLER")
        .env_remove("ZTP_USERNAME")
        .env_remove("ZTP_PASSWORD");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const TOPOLOGY: &str = r"
controller:
  host: 10.10.20.85
global_settings:
  domain: lab.local
sites:
  - name: Campus
    type: area
  - name: Floor-1
    type: floor
    parent: Campus
devices:
  sw-01:
    type: Switches and Hubs
    serial_number: FOC11111111
    template: access.j2
    site: Campus/Floor-1
  sw-02:
    type: Switches and Hubs
    serial_number: FOC22222222
    template: access.j2
    site: Campus/Floor-1
";

/// Lay out a topology file plus its template directory.
fn workspace(topology: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let topo_path = dir.path().join("topology.yaml");
    std::fs::write(&topo_path, topology).unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir(&templates).unwrap();
    std::fs::write(
        templates.join("access.j2"),
        "hostname {{ device_name }}\nip domain name {{ domain }}\n",
    )
    .unwrap();
    (dir, topo_path)
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let output = ztp_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "expected 'Usage' in:\n{text}");
}

#[test]
fn help_lists_subcommands() {
    ztp_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Zero-touch provisioning")
            .and(predicate::str::contains("provision"))
            .and(predicate::str::contains("render"))
            .and(predicate::str::contains("option43")),
    );
}

#[test]
fn completions_generate_for_bash() {
    ztp_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ztpflow"));
}

// ── option43 ────────────────────────────────────────────────────────

#[test]
fn option43_prints_text_and_hex() {
    ztp_cmd()
        .args(["option43", "172.19.45.222"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("5A1N;B2;V1;F3;K4;I172.19.45.222;J80")
                .and(predicate::str::contains("hex:")),
        );
}

#[test]
fn option43_quiet_emits_hex_only() {
    let output = ztp_cmd()
        .args(["--quiet", "option43", "10.0.0.1", "--port", "443", "--protocol", "https"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.trim();
    assert!(!line.is_empty());
    assert!(line.chars().all(|c| c.is_ascii_hexdigit()), "not hex: {line}");
}

#[test]
fn option43_rejects_port_zero() {
    ztp_cmd()
        .args(["option43", "10.0.0.1", "--port", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("port"));
}

// ── validate ────────────────────────────────────────────────────────

#[test]
fn validate_accepts_a_good_topology() {
    let (_dir, topo) = workspace(TOPOLOGY);
    ztp_cmd()
        .args(["validate"])
        .arg(&topo)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 device(s)"));
}

#[test]
fn validate_reports_every_violation() {
    let broken = TOPOLOGY
        .replace("FOC22222222", "FOC11111111")
        .replace("site: Campus/Floor-1\n  sw-02", "site: Campus/Nowhere\n  sw-02");
    let (_dir, topo) = workspace(&broken);

    let output = ztp_cmd().args(["validate"]).arg(&topo).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("shared by devices"), "missing serial violation:\n{text}");
    assert!(text.contains("Nowhere"), "missing site violation:\n{text}");
}

#[test]
fn validate_catches_template_syntax_errors() {
    let (dir, topo) = workspace(TOPOLOGY);
    std::fs::write(
        dir.path().join("templates/access.j2"),
        "hostname {{ device_name }}\n{% if domain %}unclosed\n",
    )
    .unwrap();

    let output = ztp_cmd().args(["validate"]).arg(&topo).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("access.j2"), "missing template violation:\n{text}");
}

// ── render ──────────────────────────────────────────────────────────

#[test]
fn render_writes_one_config_per_device() {
    let (dir, topo) = workspace(TOPOLOGY);
    let out = dir.path().join("out");

    ztp_cmd()
        .args(["render"])
        .arg(&topo)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let sw01 = std::fs::read_to_string(out.join("sw-01.cfg")).unwrap();
    assert!(sw01.contains("hostname sw-01"));
    assert!(sw01.contains("ip domain name lab.local"));
    assert!(out.join("sw-02.cfg").is_file());
}

#[test]
fn render_summary_prints_a_table() {
    let (_dir, topo) = workspace(TOPOLOGY);
    ztp_cmd()
        .args(["render"])
        .arg(&topo)
        .arg("--summary")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("DEVICE")
                .and(predicate::str::contains("sw-01"))
                .and(predicate::str::contains("rendered")),
        );
}

// ── controller-bound commands without config ────────────────────────

#[test]
fn devices_without_configuration_fails_cleanly() {
    let output = ztp_cmd().args(["devices"]).output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("Profile") || text.contains("profile"),
        "expected a profile error:\n{text}"
    );
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn config_path_prints_a_path() {
    ztp_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_init_writes_a_starter_file_once() {
    let home = tempfile::tempdir().unwrap();

    let mut cmd = ztp_cmd();
    cmd.env("XDG_CONFIG_HOME", home.path());
    cmd.args(["config", "init"]).assert().success();

    let written = home.path().join("ztpflow/config.toml");
    let body = std::fs::read_to_string(&written).unwrap();
    assert!(body.contains("[profiles.default]"));
    assert!(body.contains("password_env"));

    // A second init must not clobber the file without --force.
    let mut cmd = ztp_cmd();
    cmd.env("XDG_CONFIG_HOME", home.path());
    cmd.args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
