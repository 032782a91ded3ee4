//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use ngx_config::ConfigError;
use ngx_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Sites ────────────────────────────────────────────────────────
    #[error("Site '{name}' not found")]
    #[diagnostic(
        code(ngx::site_not_found),
        help("Expected a config at {path}\nRun: ngx ls to see available sites")
    )]
    SiteNotFound { name: String, path: String },

    #[error("Site '{name}' has no config to enable")]
    #[diagnostic(
        code(ngx::site_not_available),
        help(
            "Expected a config at {path}\n\
             Create one with: ngx new {name}\n\
             Or link it anyway with: ngx enable --force {name}"
        )
    )]
    SiteNotAvailable { name: String, path: String },

    #[error("Invalid name '{name}': {reason}")]
    #[diagnostic(code(ngx::invalid_name))]
    InvalidName { name: String, reason: String },

    // ── Templates ────────────────────────────────────────────────────
    #[error("Template '{name}' not found")]
    #[diagnostic(
        code(ngx::template_not_found),
        help(
            "Looked for {path}\n\
             Run: ngx templates list\n\
             Or install the bundled ones with: ngx templates install"
        )
    )]
    TemplateNotFound { name: String, path: String },

    #[error("Template '{name}' is malformed: {message}")]
    #[diagnostic(code(ngx::template_syntax), help("Run: ngx templates show {name}"))]
    TemplateSyntax { name: String, message: String },

    // ── Filesystem ───────────────────────────────────────────────────
    #[error("Permission denied: cannot {operation} {path}")]
    #[diagnostic(
        code(ngx::permission_denied),
        help(
            "Re-run with --sudo, or enable it permanently with: ngx config set sudo true"
        )
    )]
    PermissionDenied { operation: String, path: String },

    #[error("{message}")]
    #[diagnostic(code(ngx::filesystem))]
    Filesystem {
        message: String,
        #[source]
        source: std::io::Error,
    },

    // ── External commands ────────────────────────────────────────────
    #[error("`{command}` failed: {reason}")]
    #[diagnostic(code(ngx::external_command))]
    ExternalCommand { command: String, reason: String },

    #[error("No web server binary configured")]
    #[diagnostic(
        code(ngx::no_server_bin),
        help("Set it with: ngx config set server_bin /usr/sbin/nginx")
    )]
    NoServerBinary,

    #[error("Elevated run exited with status {code}")]
    #[diagnostic(code(ngx::escalated))]
    Escalated { code: i32 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ngx::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Settings file not found")]
    #[diagnostic(
        code(ngx::no_config),
        help(
            "Create one with: ngx config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ngx::config), help("Fix it with: ngx config edit"))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(ngx::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    #[diagnostic(code(ngx::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode YAML: {0}")]
    #[diagnostic(code(ngx::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SiteNotFound { .. }
            | Self::SiteNotAvailable { .. }
            | Self::TemplateNotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::InvalidName { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Escalated { code } => *code,
            _ => exit_code::GENERAL,
        }
    }

    /// Whether running the same command through sudo could succeed.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::Filesystem { source, .. } | Self::Io(source) => {
                source.kind() == std::io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidName { name, reason } => CliError::InvalidName { name, reason },

            CoreError::SourceNotFound { name, path } => CliError::SiteNotFound {
                name,
                path: path.display().to_string(),
            },

            CoreError::TargetMissing { name, path } => CliError::SiteNotAvailable {
                name,
                path: path.display().to_string(),
            },

            CoreError::TemplateNotFound { name, path } => CliError::TemplateNotFound {
                name,
                path: path.display().to_string(),
            },

            CoreError::TemplateSyntax { name, message } => {
                CliError::TemplateSyntax { name, message }
            }

            CoreError::PermissionDenied { operation, path } => CliError::PermissionDenied {
                operation,
                path: path.display().to_string(),
            },

            CoreError::DirectoryUnreadable { path, source }
            | CoreError::ReadFailed { path, source }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                CliError::PermissionDenied {
                    operation: "read".into(),
                    path: path.display().to_string(),
                }
            }

            CoreError::DirectoryUnreadable { source, .. }
            | CoreError::ReadFailed { source, .. }
            | CoreError::WriteFailed { source, .. }
            | CoreError::LinkFailed { source, .. } => CliError::Filesystem { message, source },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::Json(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
