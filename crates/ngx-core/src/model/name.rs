// ── Entry names ──
//
// Site and template names are joined onto a configured root, so a name must
// be exactly one path component. Anything that could resolve outside the
// root is rejected before the filesystem is touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Check that `raw` is usable as a single directory entry name.
///
/// Returns the reason it is not, if any.
pub(crate) fn check_entry_name(raw: &str) -> Result<(), &'static str> {
    if raw.is_empty() {
        return Err("name cannot be empty");
    }
    if raw == "." || raw == ".." {
        return Err("name cannot be '.' or '..'");
    }
    if raw.contains('/') || raw.contains('\\') {
        return Err("name cannot contain path separators");
    }
    if raw.contains('\0') {
        return Err("name cannot contain NUL bytes");
    }
    Ok(())
}

/// Name of a site: a single entry in both the available and enabled directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteName(String);

impl SiteName {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        match check_entry_name(&raw) {
            Ok(()) => Ok(Self(raw)),
            Err(reason) => Err(CoreError::InvalidName {
                name: raw,
                reason: reason.into(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SiteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SiteName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SiteName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SiteName> for String {
    fn from(name: SiteName) -> Self {
        name.0
    }
}
