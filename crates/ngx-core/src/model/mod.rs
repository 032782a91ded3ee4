// ── Domain model ──
//
// Validated names and the derived per-site state. Nothing here touches
// the filesystem; `SiteRepository` feeds directory listings in.

mod name;
mod state;

pub use name::SiteName;
pub(crate) use name::check_entry_name;
pub use state::{SiteEntry, SiteListing, SiteState};
