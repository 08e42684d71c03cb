//! Wiki pages as they move through the crawl.

use super::AssetReference;

/// A page discovered in the title index.
///
/// Created on discovery, fetched and transformed once, written once.
#[derive(Debug, Clone)]
pub struct WikiPage {
    /// Path as listed in the title index (percent-encoded)
    pub path: String,

    /// Percent-decoded path used for fetching
    pub decoded_path: String,

    pub raw_html: String,

    pub sanitized_html: String,

    /// Asset references in extraction order, duplicates included
    pub assets: Vec<AssetReference>,
}

impl WikiPage {
    pub fn new(path: impl Into<String>, decoded_path: impl Into<String>, raw_html: String) -> Self {
        Self {
            path: path.into(),
            decoded_path: decoded_path.into(),
            raw_html,
            sanitized_html: String::new(),
            assets: Vec::new(),
        }
    }
}
