mod config;
mod models;
mod scrapers;
mod storage;

use anyhow::{Context, Result};
use config::ScraperConfig;
use scrapers::{DetailCrawler, HttpFetcher, NominatimClient, PaginationDriver};
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("🏠 Santa Fe Scout - property listing crawler");
    info!("============================================");

    let config = ScraperConfig::default();
    if let Err(e) = run(&config).await {
        error!("Scrape run failed: {e:#}");
    }
    Ok(())
}

async fn run(config: &ScraperConfig) -> Result<()> {
    let fetcher = HttpFetcher::new(config)?;

    // Stage 1: enumerate listing URLs across all paginated categories.
    info!("Collecting property URLs...");
    let references = PaginationDriver::new(config, &fetcher).crawl_all().await;
    storage::save_listing_refs(&config.listing_file, &references)
        .context("Failed to persist the listing reference dataset")?;
    info!(
        "💾 Saved {} listing references to {}",
        references.len(),
        config.listing_file.display()
    );

    // Stage 2: visit each listing and fold the batch into the history.
    info!("Collecting property details...");
    let references = storage::load_listing_refs(&config.listing_file)
        .context("Failed to load the listing reference dataset")?;

    let geocoder = NominatimClient::new(config)?;
    let batch = DetailCrawler::new(config, &fetcher, &geocoder)
        .crawl(&references)
        .await;
    info!("Extracted {} property records", batch.len());

    let merged = match storage::load_history(&config.history_file)? {
        Some(history) => storage::merge_history(history, batch),
        None => batch,
    };
    storage::save_history(&config.history_file, &merged)
        .context("Failed to persist the historical dataset")?;
    info!(
        "💾 History now holds {} properties in {}",
        merged.len(),
        config.history_file.display()
    );

    Ok(())
}
