//! Shared helpers for command handlers.

use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::{debug, info};

use ngx_config::{ConfigError, Settings};
use ngx_core::SiteName;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Set in the environment of a command re-run through sudo.
pub const ELEVATED_ENV: &str = "NGX_ELEVATED";

/// Parse a site name argument.
pub fn site_name(raw: &str) -> Result<SiteName, CliError> {
    Ok(SiteName::new(raw)?)
}

/// Settings file path: `--config` / `NGX_CONFIG`, else the per-user default.
pub fn settings_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(ngx_config::config_path)
}

/// Load settings, running first-time setup when none exist yet and a
/// terminal is attached.
pub fn ensure_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    let path = settings_path(global);
    match ngx_config::load(&path) {
        Err(ConfigError::Missing { .. }) if io::stdin().is_terminal() => {
            eprintln!("No settings found at {}, starting setup.\n", path.display());
            super::config_cmd::run_wizard(&path, global)?;
            Ok(ngx_config::load(&path)?)
        }
        other => Ok(other?),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))
}

// ── External commands ────────────────────────────────────────────────

fn describe(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_owned();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Run a command with inherited stdio, failing on spawn errors and
/// non-zero exits.
fn run(program: &str, args: &[OsString]) -> Result<(), CliError> {
    let command = describe(program, args);
    debug!(%command, "running");
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| CliError::ExternalCommand {
            command: command.clone(),
            reason: e.to_string(),
        })?;
    check_status(&command, status)
}

fn check_status(command: &str, status: ExitStatus) -> Result<(), CliError> {
    if status.success() {
        Ok(())
    } else {
        Err(CliError::ExternalCommand {
            command: command.into(),
            reason: status.to_string(),
        })
    }
}

/// Open `path` in the configured editor and wait for it to exit.
///
/// The editor setting is split on whitespace, so `code --wait` works.
pub fn open_in_editor(settings: &Settings, path: &Path) -> Result<(), CliError> {
    let line = settings.editor_command();
    let mut words = line.split_whitespace();
    let program = words.next().unwrap_or("vi");
    let mut args: Vec<OsString> = words.map(OsString::from).collect();
    args.push(path.as_os_str().to_owned());
    run(program, &args)
}

/// Whether this process is already the result of a sudo re-run.
pub fn is_elevated() -> bool {
    std::env::var_os(ELEVATED_ENV).is_some_and(|v| v == "1")
}

/// Tell the web server to reload, through sudo when `use_sudo` is set.
pub fn reload_server(settings: &Settings, use_sudo: bool) -> Result<(), CliError> {
    let bin = settings
        .server_bin
        .clone()
        .or_else(|| ngx_config::find_executable("nginx"))
        .ok_or(CliError::NoServerBinary)?;

    let mut args: Vec<OsString> = vec!["-s".into(), "reload".into()];
    if use_sudo && !is_elevated() {
        args.insert(0, bin.into_os_string());
        run("sudo", &args)
    } else {
        run(&bin.to_string_lossy(), &args)
    }
}

/// Arguments for `sudo` that re-run `exe` with `user_args`.
///
/// The child gets `NGX_ELEVATED=1`, so it never escalates again, and an
/// explicit `NGX_CONFIG` so it reads the same settings file under root's
/// home directory. Any confirmation already happened in this process, so
/// `--yes` is added unless the user passed it.
fn elevated_args(
    exe: PathBuf,
    settings_path: &Path,
    user_args: impl IntoIterator<Item = OsString>,
    confirmed: bool,
) -> Vec<OsString> {
    let mut config = OsString::from("NGX_CONFIG=");
    config.push(settings_path.as_os_str());

    let mut args: Vec<OsString> = vec![
        "env".into(),
        format!("{ELEVATED_ENV}=1").into(),
        config,
        exe.into_os_string(),
    ];
    if !confirmed {
        args.push("--yes".into());
    }
    args.extend(user_args);
    args
}

/// Re-run the current command line through sudo.
pub fn rerun_elevated(settings_path: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let exe = std::env::current_exe()?;
    let args = elevated_args(exe, settings_path, std::env::args_os().skip(1), global.yes);

    if !global.quiet {
        eprintln!("Permission denied, retrying with sudo");
    }
    info!("re-running through sudo");

    let status = Command::new("sudo")
        .args(&args)
        .status()
        .map_err(|e| CliError::ExternalCommand {
            command: "sudo".into(),
            reason: e.to_string(),
        })?;
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(CliError::Escalated { code }),
        None => check_status("sudo", status),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn describe_joins_program_and_args() {
        let args: Vec<OsString> = vec!["-s".into(), "reload".into()];
        assert_eq!(describe("nginx", &args), "nginx -s reload");
    }

    #[test]
    fn failing_editor_is_reported() {
        let settings = Settings {
            editor: Some("false".into()),
            ..Settings::default()
        };
        let err = open_in_editor(&settings, Path::new("/tmp/ngx-missing")).unwrap_err();
        assert!(matches!(err, CliError::ExternalCommand { .. }));
    }

    #[test]
    fn editor_arguments_come_before_the_path() {
        let settings = Settings {
            editor: Some("true --wait".into()),
            ..Settings::default()
        };
        open_in_editor(&settings, Path::new("/tmp/whatever")).unwrap();
    }

    #[test]
    fn elevated_rerun_skips_second_confirmation() {
        let args = elevated_args(
            PathBuf::from("/usr/bin/ngx"),
            Path::new("/home/me/.config/ngx/settings.json"),
            ["rm".into(), "a.test".into()],
            false,
        );
        let expected: Vec<OsString> = [
            "env",
            "NGX_ELEVATED=1",
            "NGX_CONFIG=/home/me/.config/ngx/settings.json",
            "/usr/bin/ngx",
            "--yes",
            "rm",
            "a.test",
        ]
        .map(OsString::from)
        .into();
        assert_eq!(args, expected);
    }

    #[test]
    fn elevated_rerun_keeps_existing_yes() {
        let args = elevated_args(
            PathBuf::from("/usr/bin/ngx"),
            Path::new("/tmp/settings.json"),
            ["-y".into(), "rm".into(), "a.test".into()],
            true,
        );
        assert_eq!(args.iter().filter(|a| *a == "--yes").count(), 0);
        assert_eq!(args[4], "-y");
    }

    #[test]
    fn invalid_site_names_are_usage_errors() {
        let err = site_name("a/b").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
