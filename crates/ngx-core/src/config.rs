// ── Runtime directory configuration ──
//
// These paths describe *where* sites and templates live. They never come
// from disk inside core: the CLI resolves its settings file and builds a
// `SitesConfig` to hand to `SiteRepository::new`.

use std::path::PathBuf;

/// Directory roots a [`SiteRepository`](crate::SiteRepository) operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitesConfig {
    /// Directory holding the symlinks of active sites (e.g. `/etc/nginx/sites-enabled`).
    pub sites_enabled: PathBuf,
    /// Directory holding rendered site configs (e.g. `/etc/nginx/sites-available`).
    pub sites_available: PathBuf,
    /// Directory holding `<name>.conf` templates.
    pub templates_path: PathBuf,
}

impl SitesConfig {
    pub fn new(
        sites_enabled: impl Into<PathBuf>,
        sites_available: impl Into<PathBuf>,
        templates_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sites_enabled: sites_enabled.into(),
            sites_available: sites_available.into(),
            templates_path: templates_path.into(),
        }
    }
}
