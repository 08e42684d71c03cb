//! Asset downloads for a sanitized page.

use tokio::fs;
use tracing::{debug, info, warn};

use crate::fetch::WikiSource;
use crate::models::{AssetReference, FailureKind, FailureLog};
use crate::paths::PathResolver;

/// Outcome of fetching one page's assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetStats {
    /// Assets downloaded in this run
    pub fetched: usize,
    /// Assets already present on disk
    pub present: usize,
    /// True when a failure cut the page's asset list short
    pub abandoned: bool,
}

/// Fetch every asset of a page in extraction order.
///
/// Files already on disk are authoritative and never refetched. The first
/// failure is recorded and the remaining assets of the page are not
/// attempted.
pub async fn fetch_assets<S: WikiSource + ?Sized>(
    source: &S,
    resolver: &PathResolver,
    assets: &[AssetReference],
    failures: &mut FailureLog,
) -> AssetStats {
    let mut stats = AssetStats::default();

    for asset in assets {
        let dest = resolver.storage_path(asset);
        if fs::try_exists(&dest).await.unwrap_or(false) {
            debug!("Asset {} already present at {}", asset, dest.display());
            stats.present += 1;
            continue;
        }

        let fetch_path = resolver.fetch_path(asset);
        info!("Fetching asset {}", fetch_path);

        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                warn!("Cannot create {}: {}", parent.display(), e);
                failures.record(FailureKind::Asset, fetch_path, &e);
                stats.abandoned = true;
                return stats;
            }
        }

        match source.fetch_to_file(&fetch_path, &dest).await {
            Ok(bytes) => {
                debug!("Wrote {} bytes to {}", bytes, dest.display());
                stats.fetched += 1;
            }
            Err(e) => {
                warn!("Error fetching asset {}: {}", fetch_path, e);
                // never leave a partial file behind
                let _ = fs::remove_file(&dest).await;
                failures.record(FailureKind::Asset, fetch_path, &e);
                stats.abandoned = true;
                return stats;
            }
        }
    }

    stats
}
