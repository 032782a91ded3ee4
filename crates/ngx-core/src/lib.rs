//! Site state model and template rendering for the `ngx` CLI.
//!
//! This crate owns the only logic with real edge cases in the workspace:
//!
//! - **[`SiteRepository`]** - Models the `sites-available` / `sites-enabled`
//!   directory pair. Site state is never stored; it is derived from the two
//!   directory listings on every call (see [`SiteListing`]). Enabling a site
//!   means symlinking `<enabled>/<name>` to the absolute path of
//!   `<available>/<name>`, and nothing else.
//!
//! - **[`TemplateStore`]** - Named `<name>.conf` templates under a directory,
//!   rendered with a minimal double-brace grammar ([`template::render`]):
//!   scalar `{{name}}` substitution plus `{{#list}}…{{/list}}` repetition.
//!
//! - **[`SitesConfig`]** - Plain value describing the three directory roots.
//!   Core never reads settings files; the CLI builds one and hands it in.
//!
//! Everything here is synchronous and single-invocation. Filesystem failures
//! are classified into [`CoreError`] variants so the caller can decide what
//! to do with them, notably [`CoreError::PermissionDenied`].

pub mod config;
pub mod error;
pub mod model;
pub mod site;
pub mod template;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SitesConfig;
pub use error::CoreError;
pub use model::{SiteEntry, SiteListing, SiteName, SiteState};
pub use site::{LinkPolicy, SiteRepository};
pub use template::{RenderContext, TemplateStore, Value};
