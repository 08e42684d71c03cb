//! Storage and fetch paths for asset references.
//!
//! The storage path is where an asset lands in the output tree; the fetch
//! path is what is requested from the wiki. They differ only for
//! attachments, which are always downloaded through the raw handler.

use std::path::PathBuf;

use crate::config::MirrorConfig;
use crate::models::AssetReference;

pub const ATTACHMENT_PREFIX: &str = "/attachment/";
pub const RAW_ATTACHMENT_PREFIX: &str = "/raw-attachment/";

/// Collapse a raw attachment path to its regular attachment form.
pub fn collapse_raw_attachment(reference: &str) -> Option<String> {
    reference
        .strip_prefix(RAW_ATTACHMENT_PREFIX)
        .map(|rest| format!("{}{}", ATTACHMENT_PREFIX, rest))
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    output_dir: PathBuf,
    logo_source: String,
    logo_path: String,
}

impl PathResolver {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        logo_source: impl Into<String>,
        logo_path: impl Into<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            logo_source: logo_source.into(),
            logo_path: logo_path.into(),
        }
    }

    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(
            &config.output_dir,
            &config.sanitize.logo_source,
            &config.sanitize.logo_path,
        )
    }

    /// Site-relative path an asset is stored under, after alias rewrites.
    pub fn site_path(&self, reference: &str) -> String {
        if reference == self.logo_source {
            return self.logo_path.clone();
        }
        collapse_raw_attachment(reference).unwrap_or_else(|| reference.to_string())
    }

    /// Location of an asset in the output tree.
    pub fn storage_path(&self, reference: &AssetReference) -> PathBuf {
        self.under_output(&self.site_path(reference.as_str()))
    }

    /// Path requested from the wiki for an asset.
    pub fn fetch_path(&self, reference: &AssetReference) -> String {
        match reference.as_str().strip_prefix(ATTACHMENT_PREFIX) {
            Some(rest) => format!("{}{}", RAW_ATTACHMENT_PREFIX, rest),
            None => reference.as_str().to_string(),
        }
    }

    /// Directory holding a page's `index.html`.
    pub fn page_dir(&self, page_path: &str) -> PathBuf {
        self.under_output(page_path)
    }

    fn under_output(&self, site_path: &str) -> PathBuf {
        let relative = site_path.trim_start_matches('/');
        if relative.is_empty() {
            self.output_dir.clone()
        } else {
            self.output_dir.join(relative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> PathResolver {
        PathResolver::new("./public", "/chrome/site/logo.png", "/site/logo.png")
    }

    #[test]
    fn test_plain_reference_is_prefixed_identity() {
        let resolver = resolver();
        for reference in [
            "/chrome/common/css/trac.css",
            "/site/wiki.css",
            "/chrome/common/js/jquery.js",
            "/attachment/wiki/Start/foo.png",
        ] {
            assert_eq!(
                resolver.storage_path(&AssetReference::from(reference)),
                PathBuf::from(format!("./public{}", reference))
            );
        }
    }

    #[test]
    fn test_raw_attachment_storage_and_fetch() {
        let resolver = resolver();
        let reference = AssetReference::from("/raw-attachment/wiki/Start/foo.png");

        assert_eq!(
            resolver.storage_path(&reference),
            PathBuf::from("./public/attachment/wiki/Start/foo.png")
        );
        assert_eq!(
            resolver.fetch_path(&reference),
            "/raw-attachment/wiki/Start/foo.png"
        );
    }

    #[test]
    fn test_attachment_always_fetched_raw() {
        let resolver = resolver();
        let reference = AssetReference::from("/attachment/wiki/Start/foo.png");

        assert_eq!(
            resolver.fetch_path(&reference),
            "/raw-attachment/wiki/Start/foo.png"
        );
        assert_eq!(
            resolver.storage_path(&reference),
            PathBuf::from("./public/attachment/wiki/Start/foo.png")
        );
    }

    #[test]
    fn test_logo_alias() {
        let resolver = resolver();
        let reference = AssetReference::from("/chrome/site/logo.png");

        assert_eq!(
            resolver.storage_path(&reference),
            PathBuf::from("./public/site/logo.png")
        );
        assert_eq!(resolver.fetch_path(&reference), "/chrome/site/logo.png");
    }

    #[test]
    fn test_non_attachment_fetch_path_unchanged() {
        let resolver = resolver();
        let reference = AssetReference::from("/chrome/common/css/code.css");
        assert_eq!(resolver.fetch_path(&reference), "/chrome/common/css/code.css");
    }

    #[test]
    fn test_page_dir() {
        let resolver = resolver();
        assert_eq!(
            resolver.page_dir("/wiki/Start"),
            PathBuf::from("./public/wiki/Start")
        );
        assert_eq!(resolver.page_dir("/"), PathBuf::from("./public"));
    }

    #[test]
    fn test_collapse_raw_attachment() {
        assert_eq!(
            collapse_raw_attachment("/raw-attachment/wiki/A/b.png").as_deref(),
            Some("/attachment/wiki/A/b.png")
        );
        assert_eq!(collapse_raw_attachment("/attachment/wiki/A/b.png"), None);
    }
}
