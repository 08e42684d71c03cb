//! # tracwiki-export
//!
//! Mirrors a Trac wiki into a static HTML site.
//!
//! ## Architecture
//!
//! - **config**: Configuration loading and validation
//! - **fetch**: HTTP access to the source wiki
//! - **models**: Pages, asset references, failure log
//! - **paths**: Storage and fetch paths for assets
//! - **sanitize**: Ordered rule pipeline turning Trac pages into static ones
//! - **mirror**: Title index discovery, skip list, asset downloads, crawl loop

pub mod config;
pub mod fetch;
pub mod mirror;
pub mod models;
pub mod paths;
pub mod sanitize;

pub use models::*;
