use crate::config::ScraperConfig;
use crate::models::{ListingReference, PropertyRecord};
use crate::scrapers::extract::FieldExtractor;
use crate::scrapers::geocode::{self, ReverseGeocoder};
use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use scraper::Html;
use tracing::{info, warn};

/// Visits each listing URL in turn and extracts a property record from it.
/// Fetches are strictly sequential, spaced by the configured delay to keep
/// the request rate down on the origin server.
pub struct DetailCrawler<'a> {
    config: &'a ScraperConfig,
    fetcher: &'a dyn PageFetcher,
    geocoder: &'a dyn ReverseGeocoder,
    extractor: FieldExtractor,
}

impl<'a> DetailCrawler<'a> {
    pub fn new(
        config: &'a ScraperConfig,
        fetcher: &'a dyn PageFetcher,
        geocoder: &'a dyn ReverseGeocoder,
    ) -> Self {
        Self {
            config,
            fetcher,
            geocoder,
            extractor: FieldExtractor::new(),
        }
    }

    /// Crawl the given references (truncated to the configured limit, if
    /// any) and return the batch of successfully extracted records. A
    /// failure on one URL is logged and never aborts the batch.
    pub async fn crawl(&self, references: &[ListingReference]) -> Vec<PropertyRecord> {
        let references = match self.config.detail_limit {
            Some(limit) => &references[..references.len().min(limit)],
            None => references,
        };

        let mut batch = Vec::with_capacity(references.len());
        for (i, reference) in references.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.request_delay).await;
            }
            info!(
                "Scraping details of {} ({})",
                reference.url, reference.category
            );
            match self.scrape_one(reference).await {
                Ok(record) => batch.push(record),
                Err(e) => warn!("Skipping {}: {e:#}", reference.url),
            }
        }
        batch
    }

    async fn scrape_one(&self, reference: &ListingReference) -> Result<PropertyRecord> {
        let body = self
            .fetcher
            .fetch(&reference.url)
            .await
            .context("detail page fetch failed")?;
        let document = Html::parse_document(&body);

        let mut record = self.extractor.extract(&document, reference);
        geocode::enrich(self.geocoder, &mut record).await;
        Ok(record)
    }
}
