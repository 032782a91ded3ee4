//! Config subcommand handlers.

use std::io::Write;
use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input};

use ngx_config::{ConfigError, Settings};
use ngx_core::TemplateStore;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_path(prompt: &str, default: &Path) -> Result<PathBuf, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(default.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    Ok(PathBuf::from(value))
}

fn prompt_optional(prompt: &str, default: Option<String>) -> Result<Option<String>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(default.unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_owned()))
}

/// `sites-available` next to a `sites-enabled` path, when the name allows it.
fn sibling_available(enabled: &Path) -> Option<PathBuf> {
    let text = enabled.to_str()?;
    text.contains("enabled")
        .then(|| PathBuf::from(text.replace("enabled", "available")))
}

fn describe(settings: &Settings) -> String {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "(unset)".into());
    [
        format!("sites_enabled:   {}", settings.sites_enabled.display()),
        format!("sites_available: {}", settings.sites_available.display()),
        format!("templates_path:  {}", settings.templates_path.display()),
        format!(
            "server_bin:      {}",
            optional(settings.server_bin.as_ref().map(|p| p.display().to_string()))
        ),
        format!("editor:          {}", optional(settings.editor.clone())),
        format!("sudo:            {}", settings.sudo),
    ]
    .join("\n")
}

// ── Wizard ──────────────────────────────────────────────────────────

/// Prompt for every setting, save them to `path` and seed the template
/// directory with the bundled templates.
pub fn run_wizard(path: &Path, global: &GlobalOpts) -> Result<Settings, CliError> {
    let current = match ngx_config::read(path) {
        Ok(settings) => settings,
        Err(ConfigError::Missing { .. }) => Settings::suggested(),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable settings file");
            Settings::suggested()
        }
    };

    eprintln!("ngx setup");
    eprintln!("   Settings path: {}\n", path.display());

    let sites_enabled = prompt_path("sites-enabled directory", &current.sites_enabled)?;
    let available_default = if current.sites_available == Settings::default().sites_available {
        sibling_available(&sites_enabled).unwrap_or_else(|| current.sites_available.clone())
    } else {
        current.sites_available.clone()
    };
    let sites_available = prompt_path("sites-available directory", &available_default)?;
    let templates_path = prompt_path("Templates directory", &current.templates_path)?;
    let server_bin = prompt_optional(
        "nginx binary",
        current.server_bin.as_ref().map(|p| p.display().to_string()),
    )?
    .map(PathBuf::from);
    let editor = prompt_optional("Editor (empty: $VISUAL / $EDITOR)", current.editor.clone())?;
    let sudo = Confirm::new()
        .with_prompt("Retry through sudo on permission errors?")
        .default(current.sudo)
        .interact()
        .map_err(prompt_err)?;

    let settings = Settings {
        sites_enabled,
        sites_available,
        templates_path,
        server_bin,
        editor,
        sudo,
    };
    ngx_config::save(path, &settings)?;
    eprintln!("\n   Saved {}", path.display());

    let store = TemplateStore::new(settings.sites_config().templates_path);
    match store.install_bundled(false) {
        Ok(written) if !written.is_empty() => {
            eprintln!("   Installed templates: {}", written.join(", "));
        }
        Ok(_) => {}
        Err(e) => eprintln!("   Could not install templates: {e}"),
    }

    if !global.quiet {
        eprintln!("\nDone. Try: ngx ls");
    }
    Ok(settings)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = util::settings_path(global);

    match args.command {
        ConfigCommand::Init => {
            run_wizard(&path, global)?;
            Ok(())
        }

        ConfigCommand::Show => {
            let settings = ngx_config::load(&path)?;
            let out = output::render_single(global.output, &settings, describe, |_| {
                path.display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── Edit: temp copy, validate, replace ──────────────────────
        ConfigCommand::Edit => {
            let original = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    serde_json::to_string_pretty(&Settings::suggested())? + "\n"
                }
                Err(e) => return Err(e.into()),
            };

            let mut scratch = tempfile::Builder::new()
                .prefix("ngx-settings-")
                .suffix(".json")
                .tempfile()?;
            scratch.write_all(original.as_bytes())?;
            scratch.flush()?;

            let settings = ngx_config::load(&path).unwrap_or_default();
            util::open_in_editor(&settings, scratch.path())?;

            let edited = std::fs::read_to_string(scratch.path())?;
            if edited == original && path.exists() {
                output::print_status("No changes", global.quiet);
                return Ok(());
            }
            ngx_config::validate_json(&edited)?;

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, edited)?;
            output::print_status(&format!("Saved {}", path.display()), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut settings = match ngx_config::read(&path) {
                Err(ConfigError::Missing { .. }) => Settings::suggested(),
                other => other?,
            };
            settings.set(&key, &value)?;
            ngx_config::save(&path, &settings)?;
            output::print_status(&format!("Set {key}"), global.quiet);
            Ok(())
        }
    }
}
