//! Settings for the `ngx` CLI.
//!
//! A small JSON record at a per-user path, layered with `NGX_*` environment
//! overrides, and translated into `ngx_core::SitesConfig`. Core never reads
//! this file; the CLI loads it once per invocation and hands the result in.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
    value::Dict,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ngx_core::SitesConfig;

/// Key older settings files use for `server_bin`.
const LEGACY_SERVER_BIN: &str = "nginx_bin";

/// Prefix of environment variables that override individual fields.
pub const ENV_PREFIX: &str = "NGX_";

/// Keys accepted by [`Settings::set`] and by `NGX_*` overrides.
pub const KEYS: &[&str] = &[
    "sites_enabled",
    "sites_available",
    "templates_path",
    "server_bin",
    "editor",
    "sudo",
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file not found at {}", .path.display())]
    Missing { path: PathBuf },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings record ─────────────────────────────────────────────────

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Directory of symlinks to active sites.
    pub sites_enabled: PathBuf,

    /// Directory of rendered site configs.
    pub sites_available: PathBuf,

    /// Directory of `<name>.conf` templates. A leading `~/` is expanded.
    pub templates_path: PathBuf,

    /// Web server binary used by `reload` (`<server_bin> -s reload`).
    /// Files may still spell it `nginx_bin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_bin: Option<PathBuf>,

    /// Editor command line; falls back to `$VISUAL`, `$EDITOR`, then `vi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Run `reload` through sudo, and retry commands under sudo when they
    /// fail with a permission error.
    #[serde(default)]
    pub sudo: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            templates_path: default_templates_path(),
            server_bin: None,
            editor: None,
            sudo: false,
        }
    }
}

impl Settings {
    /// Defaults for the setup wizard, with the server binary looked up on `PATH`.
    pub fn suggested() -> Self {
        Self {
            server_bin: find_executable("nginx"),
            ..Self::default()
        }
    }

    /// Directory roots for `ngx_core::SiteRepository`.
    pub fn sites_config(&self) -> SitesConfig {
        SitesConfig::new(
            expand_home(&self.sites_enabled),
            expand_home(&self.sites_available),
            expand_home(&self.templates_path),
        )
    }

    /// Editor command line to launch, resolving the environment fallbacks.
    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| std::env::var("VISUAL").ok().filter(|e| !e.trim().is_empty()))
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| "vi".into())
    }

    /// Update one field from its string form. Empty values clear optional fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_owned());
        match key.replace('-', "_").as_str() {
            "sites_enabled" => self.sites_enabled = required_path(key, value)?,
            "sites_available" => self.sites_available = required_path(key, value)?,
            "templates_path" => self.templates_path = required_path(key, value)?,
            "server_bin" | "nginx_bin" => self.server_bin = optional(value).map(PathBuf::from),
            "editor" => self.editor = optional(value),
            "sudo" => {
                self.sudo = value.parse().map_err(|_| ConfigError::Validation {
                    field: "sudo".into(),
                    reason: "must be 'true' or 'false'".into(),
                })?;
            }
            other => {
                return Err(ConfigError::Validation {
                    field: other.into(),
                    reason: format!("unknown key. Valid keys: {}", KEYS.join(", ")),
                });
            }
        }
        Ok(())
    }
}

fn required_path(key: &str, value: &str) -> Result<PathBuf, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: key.into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(PathBuf::from(value))
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the settings file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "ngx").map_or_else(
        || home_fallback(".config").join("settings.json"),
        |dirs| dirs.config_dir().join("settings.json"),
    )
}

/// Per-user directory for templates.
pub fn default_templates_path() -> PathBuf {
    ProjectDirs::from("", "", "ngx").map_or_else(
        || home_fallback(".local/share").join("templates"),
        |dirs| dirs.data_dir().join("templates"),
    )
}

fn home_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("ngx");
    p
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), BaseDirs::new()) {
        (Ok(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => path.to_path_buf(),
    }
}

/// Look for an executable named `name` on `PATH`, then in the sbin
/// directories where web servers usually live.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path_dirs = std::env::var_os("PATH")
        .map(|raw| std::env::split_paths(&raw).collect::<Vec<_>>())
        .unwrap_or_default();

    path_dirs
        .into_iter()
        .chain(["/usr/sbin", "/usr/local/sbin", "/sbin"].map(PathBuf::from))
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

// ── Loading / saving ────────────────────────────────────────────────

/// The keys of `source`, with the legacy `nginx_bin` renamed to
/// `server_bin`. An explicit `server_bin` wins over the legacy key.
fn normalized(source: Figment) -> Result<Figment, ConfigError> {
    let mut dict: Dict = source.extract()?;
    if let Some(value) = dict.remove(LEGACY_SERVER_BIN) {
        debug!("reading legacy key {LEGACY_SERVER_BIN} as server_bin");
        dict.entry("server_bin".to_owned()).or_insert(value);
    }
    Ok(Figment::from(Serialized::defaults(dict)))
}

fn layered(base: Figment, with_env: bool) -> Result<Figment, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(normalized(base)?);
    Ok(if with_env {
        figment.merge(Env::prefixed(ENV_PREFIX).only(KEYS))
    } else {
        figment
    })
}

fn ensure_exists(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConfigError::Missing {
            path: path.to_path_buf(),
        })
    }
}

/// Load settings from `path` merged with `NGX_*` overrides.
///
/// A missing file is reported as [`ConfigError::Missing`] so the caller can
/// run first-time setup instead.
pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    ensure_exists(path)?;
    let settings: Settings = layered(Figment::from(Json::file(path)), true)?.extract()?;
    debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Load settings from `path` alone, ignoring `NGX_*` overrides.
///
/// Use this when the result is written back, so overrides never leak into
/// the file.
pub fn read(path: &Path) -> Result<Settings, ConfigError> {
    ensure_exists(path)?;
    Ok(layered(Figment::from(Json::file(path)), false)?.extract()?)
}

/// Validate settings text the way [`read`] validates a file.
pub fn validate_json(text: &str) -> Result<Settings, ConfigError> {
    Ok(layered(Figment::from(Json::string(text)), false)?.extract()?)
}

/// Write settings as pretty JSON, creating parent directories.
pub fn save(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(settings)?;
    json.push('\n');
    std::fs::write(path, json)?;
    debug!(path = %path.display(), "saved settings");
    Ok(())
}
