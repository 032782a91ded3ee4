//! Named configuration templates and the renderer that fills them in.

mod render;
mod store;

pub use render::{Record, RenderContext, SyntaxError, Value, render};
pub use store::TemplateStore;

/// File extension of templates on disk; user-facing names omit it.
pub const TEMPLATE_EXTENSION: &str = "conf";

/// Templates shipped with the binary, as `(name, source)` pairs.
///
/// `TemplateStore::install_bundled` writes these into a template directory.
pub const BUNDLED: &[(&str, &str)] = &[
    ("static", include_str!("../../templates/static.conf")),
    ("node", include_str!("../../templates/node.conf")),
    ("php", include_str!("../../templates/php.conf")),
];
