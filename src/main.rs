use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracwiki_export::config::MirrorConfig;
use tracwiki_export::fetch::{Fetcher, FetcherConfig};
use tracwiki_export::mirror::Mirror;

const DEFAULT_CONFIG: &str = "./tracwiki-export.toml";

#[derive(Parser)]
#[command(name = "tracwiki-export")]
#[command(about = "Export a Trac wiki as static HTML")]
#[command(version)]
struct Cli {
    /// Base URL of the wiki (e.g. https://wiki.example.org)
    url: String,

    /// Drop the /wiki prefix from internal links
    #[arg(long)]
    wiki: bool,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<MirrorConfig> {
    let config = match path {
        Some(path) => MirrorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MirrorConfig::from_file_or_default(DEFAULT_CONFIG.as_ref())
            .with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG))?,
    };
    Ok(config)
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_tracing(level, cli.json_logs);

    tracing::info!("Starting tracwiki-export v{}", env!("CARGO_PKG_VERSION"));

    let fetcher = Fetcher::new(FetcherConfig::new(&cli.url, &config.http))
        .context("Failed to create fetcher")?;

    let mut mirror = Mirror::new(&config, fetcher, cli.wiki)?;
    let report = match mirror.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    println!("\n=== Mirror Results ===");
    println!("Pages discovered: {}", report.pages_discovered);
    println!("Pages skipped:    {}", report.pages_skipped);
    println!("Pages written:    {}", report.pages_written);
    println!("Assets fetched:   {}", report.assets_fetched);
    println!("Assets on disk:   {}", report.assets_present);
    println!("Fetch errors:     {}", report.failures.len());
    for failure in report.failures.iter() {
        println!("  [{}] {}: {}", failure.kind, failure.path, failure.cause);
    }

    Ok(())
}
