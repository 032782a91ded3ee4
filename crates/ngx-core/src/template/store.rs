// ── Template directory ──

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::render::{RenderContext, render};
use super::{BUNDLED, TEMPLATE_EXTENSION};
use crate::error::{CoreError, classify_io};
use crate::model::check_entry_name;

/// Read-only view over a directory of `<name>.conf` templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path of template `name`.
    pub fn path(&self, name: &str) -> Result<PathBuf, CoreError> {
        check_entry_name(name).map_err(|reason| CoreError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        })?;
        Ok(self.root.join(format!("{name}.{TEMPLATE_EXTENSION}")))
    }

    /// Names of all templates, sorted, without extension.
    pub fn names(&self) -> Result<Vec<String>, CoreError> {
        let unreadable = |source| CoreError::DirectoryUnreadable {
            path: self.root.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if entry.file_type().map_err(unreadable)?.is_dir() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => names.push(stem.to_owned()),
                None => warn!(path = %path.display(), "skipping template with non UTF-8 name"),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Raw source of template `name`.
    pub fn load(&self, name: &str) -> Result<String, CoreError> {
        let path = self.path(name)?;
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CoreError::TemplateNotFound {
                name: name.into(),
                path: path.clone(),
            },
            _ => classify_io(source, "read template", &path, |source| {
                CoreError::ReadFailed {
                    path: path.clone(),
                    source,
                }
            }),
        })
    }

    /// Load template `name` and render it against `context`.
    pub fn render(&self, name: &str, context: &RenderContext) -> Result<String, CoreError> {
        let source = self.load(name)?;
        let rendered = render(&source, context).map_err(|err| CoreError::TemplateSyntax {
            name: name.into(),
            message: err.to_string(),
        })?;
        debug!(template = name, bytes = rendered.len(), "rendered template");
        Ok(rendered)
    }

    /// Write the bundled templates into the directory, creating it if needed.
    ///
    /// Existing files are left alone unless `overwrite` is set. Returns the
    /// names actually written.
    pub fn install_bundled(&self, overwrite: bool) -> Result<Vec<&'static str>, CoreError> {
        fs::create_dir_all(&self.root).map_err(|source| {
            classify_io(source, "create", &self.root, |source| CoreError::WriteFailed {
                name: "templates".into(),
                path: self.root.clone(),
                source,
            })
        })?;

        let mut written = Vec::new();
        for &(name, source) in BUNDLED {
            let path = self.path(name)?;
            if !overwrite && path.exists() {
                debug!(template = name, "keeping existing template");
                continue;
            }
            fs::write(&path, source).map_err(|err| {
                classify_io(err, "write", &path, |err| CoreError::WriteFailed {
                    name: name.into(),
                    path: path.clone(),
                    source: err,
                })
            })?;
            written.push(name);
        }
        Ok(written)
    }
}
