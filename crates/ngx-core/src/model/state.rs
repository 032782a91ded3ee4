// ── Derived site state ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::Display;

/// State of a site, derived from which directories hold an entry for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SiteState {
    /// Present in both directories: the link is live.
    Enabled,
    /// Rendered config exists but nothing links to it.
    Available,
    /// Link exists but the config it should point at does not.
    Dangling,
}

impl SiteState {
    /// Derive the state from entry presence in each directory.
    ///
    /// `None` means the site does not exist at all.
    pub fn from_presence(in_enabled: bool, in_available: bool) -> Option<Self> {
        match (in_enabled, in_available) {
            (true, true) => Some(Self::Enabled),
            (false, true) => Some(Self::Available),
            (true, false) => Some(Self::Dangling),
            (false, false) => None,
        }
    }
}

/// A single row of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteEntry {
    pub name: String,
    pub state: SiteState,
}

/// Three-way partition of site names across the two directories.
///
/// The sets are disjoint. Names are compared verbatim; the link target of
/// an enabled entry is not inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteListing {
    pub enabled: BTreeSet<String>,
    pub available: BTreeSet<String>,
    pub dangling: BTreeSet<String>,
}

impl SiteListing {
    /// Partition the entry names of the enabled and available directories.
    pub fn partition<E, A>(enabled_entries: E, available_entries: A) -> Self
    where
        E: IntoIterator<Item = String>,
        A: IntoIterator<Item = String>,
    {
        let linked: BTreeSet<String> = enabled_entries.into_iter().collect();
        let mut available: BTreeSet<String> = available_entries.into_iter().collect();

        let mut listing = Self::default();
        for name in linked {
            if available.remove(&name) {
                listing.enabled.insert(name);
            } else {
                listing.dangling.insert(name);
            }
        }
        listing.available = available;
        listing
    }

    pub fn state_of(&self, name: &str) -> Option<SiteState> {
        if self.enabled.contains(name) {
            Some(SiteState::Enabled)
        } else if self.available.contains(name) {
            Some(SiteState::Available)
        } else if self.dangling.contains(name) {
            Some(SiteState::Dangling)
        } else {
            None
        }
    }

    /// Flatten into rows sorted by name.
    pub fn entries(&self) -> Vec<SiteEntry> {
        let tagged = |set: &BTreeSet<String>, state: SiteState| {
            set.iter()
                .map(move |name| SiteEntry {
                    name: name.clone(),
                    state,
                })
                .collect::<Vec<_>>()
        };

        let mut rows = tagged(&self.enabled, SiteState::Enabled);
        rows.extend(tagged(&self.available, SiteState::Available));
        rows.extend(tagged(&self.dangling, SiteState::Dangling));
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn len(&self) -> usize {
        self.enabled.len() + self.available.len() + self.dangling.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
