//! Asset references extracted from sanitized pages.

use std::fmt;

/// A root-relative asset path as it appears in sanitized HTML.
///
/// Its storage and fetch paths are derived by [`crate::paths::PathResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetReference(String);

impl AssetReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for references the crawl mirrors: root-relative, not
    /// protocol-relative, and naming a file rather than a directory.
    pub fn is_local(reference: &str) -> bool {
        reference.starts_with('/') && !reference.starts_with("//") && !reference.ends_with('/')
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetReference {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
