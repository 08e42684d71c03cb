//! Static export of fetched wiki pages.
//!
//! A page is parsed once and run through an ordered list of named [`Rule`]s.
//! Each rule mutates the document in place; later rules rely on the
//! removals done by earlier ones, so the order in [`rules::default_rules`]
//! is significant.

pub mod rules;

use dom_query::Document;
use regex::Regex;

use crate::config::{MirrorConfig, SanitizeConfig};
use crate::models::AssetReference;

pub use rules::Rule;

/// Inputs shared by every page of a crawl.
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Wiki origin stripped from absolute script and stylesheet URLs
    pub base_url: String,

    /// Drop `wiki_prefix` from internal links
    pub rewrite_wiki_links: bool,

    pub wiki_prefix: String,

    pub skin: SanitizeConfig,
}

impl SanitizeOptions {
    pub fn from_config(config: &MirrorConfig, base_url: &str, rewrite_wiki_links: bool) -> Self {
        Self {
            base_url: base_url.to_string(),
            rewrite_wiki_links,
            wiki_prefix: config.wiki_prefix.clone(),
            skin: config.sanitize.clone(),
        }
    }
}

/// Per-page state handed to each rule.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub options: &'a SanitizeOptions,
    /// Asset references collected so far, in extraction order
    pub assets: Vec<AssetReference>,
}

/// Result of sanitizing one page.
#[derive(Debug, Clone)]
pub struct SanitizedPage {
    pub html: String,
    pub assets: Vec<AssetReference>,
}

pub struct Sanitizer {
    options: SanitizeOptions,
    rules: Vec<Rule>,
}

impl Sanitizer {
    pub fn new(options: SanitizeOptions) -> Self {
        Self::with_rules(options, rules::default_rules())
    }

    pub fn with_rules(options: SanitizeOptions, rules: Vec<Rule>) -> Self {
        Self { options, rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Run the pipeline over a fetched page.
    pub fn sanitize(&self, raw_html: &str) -> SanitizedPage {
        let html = normalize_root_namespace(raw_html);
        let document = Document::from(html.as_str());

        let mut ctx = PageContext {
            options: &self.options,
            assets: Vec::new(),
        };

        for rule in &self.rules {
            (rule.apply)(&document, &mut ctx);
        }

        SanitizedPage {
            html: document.html().to_string(),
            assets: ctx.assets,
        }
    }
}

/// Replace the XHTML root namespace declaration with a plain language
/// attribute so the page is treated as HTML5.
pub fn normalize_root_namespace(html: &str) -> String {
    let re = Regex::new(r#"xmlns="[^"]+""#).unwrap();
    re.replace(html, r#"lang="en""#).into_owned()
}
