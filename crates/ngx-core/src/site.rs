// ── Site repository ──
//
// The symlink protocol between `sites-available` and `sites-enabled`.
// State is derived from directory contents on every call; nothing is cached.
// Each mutation is a single filesystem call or a short sequence of them, with
// no locking: two invocations racing on one name resolve as last-write-wins.

use std::fs::{self, File};
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::SitesConfig;
use crate::error::{CoreError, classify_io};
use crate::model::{SiteListing, SiteName, SiteState};
use crate::template::{RenderContext, TemplateStore};

/// What `enable` does when the site has no available config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Fail with [`CoreError::TargetMissing`].
    #[default]
    RequireTarget,
    /// Create the link anyway; the site shows up as dangling.
    AllowDangling,
}

/// Which error a non-permission I/O failure maps to.
#[derive(Clone, Copy)]
enum Op {
    Write,
    Link,
}

/// Sites stored as files in one directory and enabled via symlinks in another.
#[derive(Debug, Clone)]
pub struct SiteRepository {
    config: SitesConfig,
    templates: TemplateStore,
}

impl SiteRepository {
    pub fn new(config: SitesConfig) -> Self {
        let templates = TemplateStore::new(config.templates_path.clone());
        Self { config, templates }
    }

    pub fn config(&self) -> &SitesConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn available_path(&self, name: &SiteName) -> PathBuf {
        self.config.sites_available.join(name.as_str())
    }

    pub fn enabled_path(&self, name: &SiteName) -> PathBuf {
        self.config.sites_enabled.join(name.as_str())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Partition every site into enabled / available-only / dangling.
    pub fn list(&self) -> Result<SiteListing, CoreError> {
        let enabled = shallow_entries(&self.config.sites_enabled)?;
        let available = shallow_entries(&self.config.sites_available)?;
        Ok(SiteListing::partition(enabled, available))
    }

    /// State of a single site, or `None` if neither directory has an entry.
    pub fn state(&self, name: &SiteName) -> Option<SiteState> {
        SiteState::from_presence(
            has_entry(&self.enabled_path(name)),
            has_entry(&self.available_path(name)),
        )
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Render `template` for a new site, write it as the available config
    /// (replacing any previous one) and enable it.
    ///
    /// Nothing is written if rendering fails. If enabling fails the config
    /// stays behind and the site is left available.
    pub fn create(
        &self,
        name: &SiteName,
        root: &Path,
        template: &str,
        ports: &[u16],
    ) -> Result<(), CoreError> {
        let context = RenderContext::for_site(name.as_str(), &root.to_string_lossy(), ports);
        let rendered = self.templates.render(template, &context)?;

        let path = self.available_path(name);
        fs::write(&path, rendered).map_err(|e| fs_error(Op::Write, "write", name, &path, e))?;
        info!(site = %name, template, path = %path.display(), "wrote site config");

        self.enable(name, LinkPolicy::RequireTarget)
    }

    /// Point `<enabled>/<name>` at `<available>/<name>`, replacing whatever
    /// entry was there before.
    pub fn enable(&self, name: &SiteName, policy: LinkPolicy) -> Result<(), CoreError> {
        let link = self.enabled_path(name);
        let target = std::path::absolute(self.available_path(name))
            .map_err(|e| fs_error(Op::Link, "resolve", name, &link, e))?;

        if !has_entry(&target) {
            match policy {
                LinkPolicy::RequireTarget => {
                    return Err(CoreError::TargetMissing {
                        name: name.to_string(),
                        path: target,
                    });
                }
                LinkPolicy::AllowDangling => {
                    warn!(site = %name, target = %target.display(), "enabling site without a config");
                }
            }
        }

        if remove_entry(name, &link)? {
            debug!(site = %name, "replaced existing link");
        }
        symlink(&target, &link).map_err(|e| fs_error(Op::Link, "create link", name, &link, e))?;
        info!(site = %name, link = %link.display(), target = %target.display(), "enabled site");
        Ok(())
    }

    /// Remove the enabled link, dangling or not. Returns whether one existed.
    pub fn disable(&self, name: &SiteName) -> Result<bool, CoreError> {
        let removed = remove_entry(name, &self.enabled_path(name))?;
        if removed {
            info!(site = %name, "disabled site");
        } else {
            debug!(site = %name, "site was not enabled");
        }
        Ok(removed)
    }

    /// Disable the site, then delete its available config.
    ///
    /// Returns whether anything was removed; removing an absent site is a no-op.
    pub fn remove(&self, name: &SiteName) -> Result<bool, CoreError> {
        let unlinked = self.disable(name)?;

        let path = self.available_path(name);
        let deleted = match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(fs_error(Op::Write, "remove", name, &path, e)),
        };
        if deleted {
            info!(site = %name, path = %path.display(), "removed site config");
        }
        Ok(unlinked || deleted)
    }

    /// Duplicate the available config of `source` as `target`, keeping
    /// permissions and modification time. The copy is not enabled.
    ///
    /// Returns the number of bytes copied.
    pub fn copy(&self, source: &SiteName, target: &SiteName) -> Result<u64, CoreError> {
        if source == target {
            return Err(CoreError::InvalidName {
                name: target.to_string(),
                reason: "copy target must differ from the source".into(),
            });
        }

        let from = self.available_path(source);
        let metadata = match fs::metadata(&from) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => {
                return Err(CoreError::SourceNotFound {
                    name: source.to_string(),
                    path: from,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::SourceNotFound {
                    name: source.to_string(),
                    path: from,
                });
            }
            Err(e) => {
                return Err(classify_io(e, "read", &from, |source| CoreError::ReadFailed {
                    path: from.clone(),
                    source,
                }));
            }
        };

        let to = self.available_path(target);
        let bytes = fs::copy(&from, &to).map_err(|e| fs_error(Op::Write, "write", target, &to, e))?;
        // Timestamps only need ownership; the copy may already be read-only.
        if let Ok(modified) = metadata.modified() {
            File::open(&to)
                .and_then(|file| file.set_modified(modified))
                .map_err(|e| fs_error(Op::Write, "write", target, &to, e))?;
        }
        info!(from = %source, to = %target, bytes, "copied site config");
        Ok(bytes)
    }
}

// ── Filesystem helpers ──────────────────────────────────────────────

fn fs_error(op: Op, operation: &str, name: &SiteName, path: &Path, source: io::Error) -> CoreError {
    classify_io(source, operation, path, |source| match op {
        Op::Write => CoreError::WriteFailed {
            name: name.to_string(),
            path: path.to_path_buf(),
            source,
        },
        Op::Link => CoreError::LinkFailed {
            name: name.to_string(),
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Whether `path` names an entry the listing would report (anything but a
/// directory; links are not followed).
fn has_entry(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| !meta.is_dir())
}

/// Remove a non-directory entry, tolerating its absence.
fn remove_entry(name: &SiteName, path: &Path) -> Result<bool, CoreError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            return Err(CoreError::LinkFailed {
                name: name.to_string(),
                path: path.to_path_buf(),
                source: io::Error::other("a directory is in the way"),
            });
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(fs_error(Op::Link, "inspect", name, path, e)),
    }

    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_error(Op::Link, "remove link", name, path, e)),
    }
}

/// Names of the non-directory entries directly under `dir`.
fn shallow_entries(dir: &Path) -> Result<Vec<String>, CoreError> {
    let unreadable = |source| CoreError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        if entry.file_type().map_err(unreadable)?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(dir = %dir.display(), entry = ?raw, "skipping non UTF-8 entry"),
        }
    }
    Ok(names)
}
