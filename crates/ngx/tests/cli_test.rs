//! Integration tests for the `ngx` CLI binary.
//!
//! Each test that touches sites builds a scratch `sites-enabled` /
//! `sites-available` / templates tree in a temp directory and points the
//! binary at it with `--config`.
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ngx` binary with env isolation.
///
/// Clears the `NGX_*` variables and points the home and config
/// directories at `home`, so tests never touch the user's real settings.
fn ngx_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ngx");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env("NO_COLOR", "1")
        .env_remove("NGX_CONFIG")
        .env_remove("NGX_OUTPUT")
        .env_remove("NGX_ELEVATED")
        .env_remove("NGX_SITES_ENABLED")
        .env_remove("NGX_SITES_AVAILABLE")
        .env_remove("NGX_TEMPLATES_PATH")
        .env_remove("NGX_SERVER_BIN")
        .env_remove("NGX_EDITOR")
        .env_remove("NGX_SUDO")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A scratch site tree with settings pointing at it.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for sub in ["enabled", "available", "templates"] {
            fs::create_dir(dir.path().join(sub)).unwrap();
        }
        let settings = serde_json::json!({
            "sites_enabled": dir.path().join("enabled"),
            "sites_available": dir.path().join("available"),
            "templates_path": dir.path().join("templates"),
            "editor": "true",
        });
        fs::write(
            dir.path().join("settings.json"),
            serde_json::to_string_pretty(&settings).unwrap(),
        )
        .unwrap();

        let sandbox = Self { dir };
        sandbox.cmd().args(["templates", "install"]).assert().success();
        sandbox
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = ngx_cmd(self.dir.path());
        cmd.arg("--config").arg(self.path("settings.json"));
        cmd
    }

    fn states(&self) -> serde_json::Value {
        let output = self.cmd().args(["ls", "-o", "json"]).output().unwrap();
        assert!(output.status.success(), "{}", combined_output(&output));
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = ngx_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    ngx_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("nginx")
            .and(predicate::str::contains("enable"))
            .and(predicate::str::contains("templates")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    ngx_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ngx"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    for shell in ["bash", "zsh", "fish"] {
        ngx_cmd(home.path())
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::is_empty().not());
    }
}

// ── Missing settings ────────────────────────────────────────────────

#[test]
fn test_ls_without_settings_points_at_init() {
    let home = TempDir::new().unwrap();
    let output = ngx_cmd(home.path()).arg("ls").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("ngx config init"), "{text}");
}

// ── Site lifecycle ──────────────────────────────────────────────────

#[test]
fn test_new_renders_and_enables() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["new", "site.test", "--root", "/srv/site", "-p", "8080", "-p", "8081"])
        .assert()
        .success();

    let config = fs::read_to_string(sandbox.path("available/site.test")).unwrap();
    assert!(config.contains("    listen 8080;\n    listen 8081;\n"));
    assert!(config.contains("server_name site.test;"));
    assert!(config.contains("root /srv/site;"));

    let link = fs::read_link(sandbox.path("enabled/site.test")).unwrap();
    assert!(link.is_absolute());
    assert!(link.ends_with("available/site.test"));

    let states = sandbox.states();
    assert_eq!(states[0]["name"], "site.test");
    assert_eq!(states[0]["state"], "enabled");
}

#[test]
fn test_new_with_unknown_template_writes_nothing() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .cmd()
        .args(["new", "site.test", "--template", "rails"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("rails"));
    assert!(!sandbox.path("available/site.test").exists());
}

#[test]
fn test_disable_then_enable() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["new", "a.test"]).assert().success();

    sandbox.cmd().args(["disable", "a.test"]).assert().success();
    assert_eq!(sandbox.states()[0]["state"], "available");
    assert!(fs::symlink_metadata(sandbox.path("enabled/a.test")).is_err());

    // a second disable is a no-op
    sandbox.cmd().args(["disable", "a.test"]).assert().success();

    sandbox.cmd().args(["enable", "a.test"]).assert().success();
    assert_eq!(sandbox.states()[0]["state"], "enabled");
}

#[test]
fn test_enable_missing_site() {
    let sandbox = Sandbox::new();
    let output = sandbox.cmd().args(["enable", "ghost"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("--force"));
    assert!(fs::symlink_metadata(sandbox.path("enabled/ghost")).is_err());

    sandbox.cmd().args(["enable", "--force", "ghost"]).assert().success();
    assert_eq!(sandbox.states()[0]["state"], "dangling");
}

#[test]
fn test_rm_requires_confirmation() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["new", "gone.test"]).assert().success();

    let output = sandbox.cmd().args(["rm", "gone.test"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(sandbox.path("available/gone.test").exists());

    sandbox.cmd().args(["rm", "-y", "gone.test"]).assert().success();
    assert!(!sandbox.path("available/gone.test").exists());
    assert!(fs::symlink_metadata(sandbox.path("enabled/gone.test")).is_err());
    assert_eq!(sandbox.states(), serde_json::json!([]));
}

#[test]
fn test_invalid_site_name() {
    let sandbox = Sandbox::new();
    let output = sandbox.cmd().args(["new", "../evil"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!sandbox.path("evil").exists());
}

#[test]
fn test_cp_copies_without_enabling() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["new", "a.test"]).assert().success();
    sandbox.cmd().args(["cp", "a.test", "b.test"]).assert().success();

    assert_eq!(
        fs::read(sandbox.path("available/a.test")).unwrap(),
        fs::read(sandbox.path("available/b.test")).unwrap()
    );
    assert!(fs::symlink_metadata(sandbox.path("enabled/b.test")).is_err());

    let output = sandbox
        .cmd()
        .args(["cp", "--no-edit", "nope", "c.test"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(!sandbox.path("available/c.test").exists());
}

#[test]
fn test_ls_plain_and_listing_partition() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.path("available/a"), "").unwrap();
    fs::write(sandbox.path("available/b"), "").unwrap();
    std::os::unix::fs::symlink(sandbox.path("available/a"), sandbox.path("enabled/a")).unwrap();
    std::os::unix::fs::symlink(sandbox.path("available/c"), sandbox.path("enabled/c")).unwrap();

    sandbox
        .cmd()
        .args(["ls", "-o", "plain"])
        .assert()
        .success()
        .stdout("a\nb\nc\n");

    let states = sandbox.states();
    let pairs: Vec<(String, String)> = states
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["name"].as_str().unwrap().to_owned(),
                e["state"].as_str().unwrap().to_owned(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("a".to_owned(), "enabled".to_owned()),
            ("b".to_owned(), "available".to_owned()),
            ("c".to_owned(), "dangling".to_owned()),
        ]
    );
}

#[test]
fn test_open_runs_editor() {
    let sandbox = Sandbox::new();
    sandbox.cmd().args(["new", "a.test"]).assert().success();
    sandbox.cmd().args(["open", "a.test"]).assert().success();

    sandbox
        .cmd()
        .args(["config", "set", "editor", "false"])
        .assert()
        .success();
    sandbox.cmd().args(["open", "a.test"]).assert().failure();
}

// ── Templates ───────────────────────────────────────────────────────

#[test]
fn test_templates_list_and_show() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["templates", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("node\nphp\nstatic\n");

    sandbox
        .cmd()
        .args(["templates", "show", "static"])
        .assert()
        .success()
        .stdout(predicate::str::contains("server_name {{server_name}};"));

    sandbox
        .cmd()
        .args(["templates", "show", "missing"])
        .assert()
        .code(4);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_and_show() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "set", "server-bin", "/opt/nginx/sbin/nginx"])
        .assert()
        .success();

    let output = sandbox
        .cmd()
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["server_bin"], "/opt/nginx/sbin/nginx");
    assert_eq!(shown["sudo"], false);

    sandbox
        .cmd()
        .args(["config", "set", "colour", "red"])
        .assert()
        .code(2);
}

#[test]
fn test_config_path_honours_flag() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("settings.json"));
}

#[test]
fn test_config_show_reflects_env_overrides() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .cmd()
        .env("NGX_SUDO", "true")
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["sudo"], true);
}

#[test]
fn test_reload_reports_server_failure() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "set", "server_bin", "false"])
        .assert()
        .success();
    let output = sandbox.cmd().arg("reload").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("-s reload"));
}
