// ── Core error types ──
//
// Every filesystem failure is classified before it leaves the crate.
// Consumers never see a bare `io::Error`; an `io::ErrorKind::PermissionDenied`
// always becomes `CoreError::PermissionDenied` so the dispatcher can decide
// whether to retry with elevated privileges.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    // ── Template errors ──────────────────────────────────────────────
    #[error("Template '{name}' not found at {}", .path.display())]
    TemplateNotFound { name: String, path: PathBuf },

    #[error("Template '{name}' is malformed: {message}")]
    TemplateSyntax { name: String, message: String },

    // ── Filesystem errors ────────────────────────────────────────────
    #[error("Cannot read directory {}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read {}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{name}' to {}", .path.display())]
    WriteFailed {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to link site '{name}' at {}", .path.display())]
    LinkFailed {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied: cannot {operation} {}", .path.display())]
    PermissionDenied { operation: String, path: PathBuf },

    // ── Site state errors ────────────────────────────────────────────
    #[error("Site '{name}' does not exist ({} is missing)", .path.display())]
    SourceNotFound { name: String, path: PathBuf },

    #[error("Cannot enable '{name}': {} does not exist", .path.display())]
    TargetMissing { name: String, path: PathBuf },
}

impl CoreError {
    /// Whether retrying the same operation with more privileges could help.
    ///
    /// True for [`CoreError::PermissionDenied`], and for listing failures
    /// whose underlying cause was a permission error.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::DirectoryUnreadable { source, .. } | Self::ReadFailed { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}

/// Classify an I/O failure: permission problems become
/// [`CoreError::PermissionDenied`], everything else goes through `otherwise`.
pub(crate) fn classify_io(
    source: io::Error,
    operation: &str,
    path: &Path,
    otherwise: impl FnOnce(io::Error) -> CoreError,
) -> CoreError {
    if source.kind() == io::ErrorKind::PermissionDenied {
        CoreError::PermissionDenied {
            operation: operation.into(),
            path: path.to_path_buf(),
        }
    } else {
        otherwise(source)
    }
}
