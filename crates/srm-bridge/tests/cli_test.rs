//! Integration tests for the `srm-bridge` binary.
//!
//! Argument parsing, help, completions, config handling, and error exit
//! codes, all without a router.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// `srm-bridge` with env isolation: no `SRM_*` variables and config
/// directories pointed at a nonexistent path.
fn srm_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("srm-bridge");
    cmd.env("HOME", "/tmp/srm-bridge-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/srm-bridge-test-nonexistent")
        .env_remove("SRM_CONFIG")
        .env_remove("SRM_PASSWORD")
        .env_remove("SRM_ROUTER__HOST")
        .env_remove("SRM_POLLING__INTERVAL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = srm_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "expected usage:\n{stderr}");
}

#[test]
fn test_help_lists_commands() {
    srm_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("snapshot"))
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    srm_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("srm-bridge"));
}

#[test]
fn test_completions_bash() {
    srm_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srm-bridge"));
}

#[test]
fn test_unknown_output_format_rejected() {
    srm_cmd()
        .args(["snapshot", "--output", "xml"])
        .assert()
        .code(2);
}

// ── check ───────────────────────────────────────────────────────────

#[test]
fn test_check_with_defaults() {
    srm_cmd().arg("check").assert().success().stdout(
        predicate::str::contains("https://192.168.1.1:8001/")
            .and(predicate::str::contains("60s"))
            .and(predicate::str::contains("timeout-only")),
    );
}

#[test]
fn test_check_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "[router]\nhost = \"10.1.2.3\"\nport = 8443\npassword = \"pw\"\n\n[polling]\ninterval = 120\n",
    );

    srm_cmd()
        .args(["--color", "never", "check", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://10.1.2.3:8443/")
                .and(predicate::str::contains("120s"))
                .and(predicate::str::contains("configured")),
        );
}

#[test]
fn test_check_clamps_short_interval() {
    srm_cmd()
        .args(["check", "--interval", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("60s"));
}

#[test]
fn test_check_rejects_invalid_address() {
    srm_cmd()
        .args(["check", "--host", "256.1.1.1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid IPv4 address"));
}

#[test]
fn test_missing_explicit_config_file() {
    srm_cmd()
        .args(["check", "--config", "/tmp/srm-bridge-test-nonexistent/absent.toml"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_override() {
    srm_cmd()
        .args(["config", "path", "--config", "/etc/srm/bridge.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/srm/bridge.toml"));
}

#[test]
fn test_config_init_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("srm").join("config.toml");

    srm_cmd()
        .args(["config", "init", "--host", "10.0.0.1", "--config"])
        .arg(&path)
        .assert()
        .success();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("host = \"10.0.0.1\""), "{written}");

    srm_cmd()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

// ── snapshot / run ──────────────────────────────────────────────────

#[test]
fn test_snapshot_without_password_is_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    // An address nothing will ever own, so a stored keyring entry can't match.
    let path = write_config(
        dir.path(),
        "[router]\nhost = \"192.0.2.123\"\nusername = \"srm-bridge-cli-test\"\n",
    );

    srm_cmd()
        .args(["snapshot", "--config"])
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No password configured"));
}

#[test]
fn test_run_rejects_invalid_address_before_connecting() {
    srm_cmd()
        .args(["run", "--host", "10.0.0"])
        .env("SRM_PASSWORD", "pw")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("router.host"));
}
