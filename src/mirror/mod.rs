//! Crawl orchestrator.
//!
//! Coordinates one mirror run:
//! 1. Fetch the title index and list the pages
//! 2. Drop skip-listed pages
//! 3. For each page, in index order: fetch, sanitize, write `index.html`
//! 4. Fetch the page's assets into the output tree
//!
//! Everything runs sequentially; page fetches are spaced by a [`Pacer`].

pub mod assets;
pub mod discovery;
pub mod pacing;
pub mod skip;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, MirrorConfig};
use crate::fetch::WikiSource;
use crate::models::{FailureKind, FailureLog, WikiPage};
use crate::paths::PathResolver;
use crate::sanitize::{SanitizeOptions, Sanitizer};

pub use assets::{fetch_assets, AssetStats};
pub use discovery::{discover_pages, parse_title_index};
pub use pacing::{IntervalPacer, Pacer, Unpaced};
pub use skip::SkipFilter;

/// Errors that end the whole crawl.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Error decoding page path {0}")]
    Decode(String),

    #[error("Unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl MirrorError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            MirrorError::Decode(_) => 2,
            MirrorError::Write { .. } | MirrorError::Config(_) => 1,
        }
    }
}

/// Phase of a mirror run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlState {
    #[default]
    Idle,
    DiscoveringIndex,
    ProcessingPage,
    Done,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    pub pages_discovered: usize,
    pub pages_skipped: usize,
    pub pages_written: usize,
    pub assets_fetched: usize,
    pub assets_present: usize,
    pub failures: FailureLog,
    pub duration: Duration,
}

/// Decode a percent-encoded page path.
///
/// Malformed escapes and non UTF-8 results are rejected.
pub fn decode_page_path(path: &str) -> Result<String, MirrorError> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(MirrorError::Decode(path.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| MirrorError::Decode(path.to_string()))
}

/// Drives a mirror run against a [`WikiSource`].
pub struct Mirror<S, P> {
    source: S,
    pacer: P,
    sanitizer: Sanitizer,
    resolver: PathResolver,
    skip: SkipFilter,
    index_path: String,
    state: CrawlState,
}

impl<S: WikiSource> Mirror<S, IntervalPacer> {
    /// Create a mirror paced by the configured page delay.
    pub fn new(
        config: &MirrorConfig,
        source: S,
        rewrite_wiki_links: bool,
    ) -> Result<Self, MirrorError> {
        let pacer = IntervalPacer::new(config.page_delay());
        Self::with_pacer(config, source, pacer, rewrite_wiki_links)
    }
}

impl<S: WikiSource, P: Pacer> Mirror<S, P> {
    pub fn with_pacer(
        config: &MirrorConfig,
        source: S,
        pacer: P,
        rewrite_wiki_links: bool,
    ) -> Result<Self, MirrorError> {
        let options = SanitizeOptions::from_config(config, source.base_url(), rewrite_wiki_links);

        Ok(Self {
            sanitizer: Sanitizer::new(options),
            resolver: PathResolver::from_config(config),
            skip: SkipFilter::from_config(&config.skip)?,
            index_path: config.index_path.clone(),
            source,
            pacer,
            state: CrawlState::Idle,
        })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the crawl to completion.
    ///
    /// Fetch failures are collected in the report; only a page path that
    /// cannot be decoded or a page that cannot be written aborts the run.
    pub async fn run(&mut self) -> Result<MirrorReport, MirrorError> {
        let start = std::time::Instant::now();
        let mut report = MirrorReport::default();

        self.state = CrawlState::DiscoveringIndex;
        let pages = discover_pages(&self.source, &self.index_path, &mut report.failures).await;
        report.pages_discovered = pages.len();

        self.state = CrawlState::ProcessingPage;
        for page_path in &pages {
            if self.skip.should_skip(page_path) {
                debug!("Skipping {}", page_path);
                report.pages_skipped += 1;
                continue;
            }
            self.process_page(page_path, &mut report).await?;
        }

        self.state = CrawlState::Done;
        report.duration = start.elapsed();

        info!(
            "Mirror completed: {} pages written, {} assets fetched, {} failures in {:?}",
            report.pages_written,
            report.assets_fetched,
            report.failures.len(),
            report.duration
        );

        Ok(report)
    }

    async fn process_page(
        &mut self,
        page_path: &str,
        report: &mut MirrorReport,
    ) -> Result<(), MirrorError> {
        let decoded = decode_page_path(page_path)?;

        let page_dir = self.resolver.page_dir(page_path);
        fs::create_dir_all(&page_dir)
            .await
            .map_err(|source| MirrorError::Write {
                path: page_dir.clone(),
                source,
            })?;

        self.pacer.wait().await;

        info!("Fetching {}{}", self.source.base_url(), decoded);
        let raw_html = match self.source.fetch_text(&decoded).await {
            Ok(html) => html,
            Err(e) => {
                error!("Error fetching {}{}: {}", self.source.base_url(), decoded, e);
                report.failures.record(FailureKind::Page, page_path, &e);
                return Ok(());
            }
        };

        let mut page = WikiPage::new(page_path, decoded, raw_html);
        let sanitized = self.sanitizer.sanitize(&page.raw_html);
        page.sanitized_html = sanitized.html;
        page.assets = sanitized.assets;

        let index_file = page_dir.join("index.html");
        fs::write(&index_file, &page.sanitized_html)
            .await
            .map_err(|source| MirrorError::Write {
                path: index_file.clone(),
                source,
            })?;
        report.pages_written += 1;

        let stats = fetch_assets(
            &self.source,
            &self.resolver,
            &page.assets,
            &mut report.failures,
        )
        .await;
        if stats.abandoned {
            warn!("Remaining assets of {} were not fetched", page.path);
        }
        report.assets_fetched += stats.fetched;
        report.assets_present += stats.present;

        Ok(())
    }
}
