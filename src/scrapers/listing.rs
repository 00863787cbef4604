use crate::config::ScraperConfig;
use crate::models::{Category, ListingReference};
use crate::scrapers::traits::PageFetcher;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{info, warn};

/// One property card scraped from a listing page, before it gets an index
/// and a category.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub url: String,
    pub image_url: String,
}

/// Extract all property cards from one listing page. A missing or
/// unparseable container yields an empty page; a broken individual card is
/// logged and skipped without dropping the rest of the page.
pub fn parse_listing_page(html: &str, site_root: &str) -> Vec<ListingCard> {
    let container_selector = Selector::parse("div.row.mt-4.properties-to-display").unwrap();
    let card_selector = Selector::parse("div.property-card").unwrap();

    let document = Html::parse_document(html);
    let Some(container) = document.select(&container_selector).next() else {
        return Vec::new();
    };

    let mut cards = Vec::new();
    for card in container.select(&card_selector) {
        match parse_card(card, site_root) {
            Some(parsed) => cards.push(parsed),
            None => warn!("Skipping a property card with no link or preview image"),
        }
    }
    cards
}

fn parse_card(card: ElementRef<'_>, site_root: &str) -> Option<ListingCard> {
    let link_selector = Selector::parse("a").unwrap();
    let preview_selector = Selector::parse("div.img-preview").unwrap();

    let href = card
        .select(&link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))?;
    let style = card
        .select(&preview_selector)
        .next()
        .and_then(|div| div.value().attr("style"))?;

    Some(ListingCard {
        url: format!("{site_root}{href}"),
        image_url: image_url_from_style(style),
    })
}

/// Pull the URL out of an inline `background-image: url(...)` declaration.
fn image_url_from_style(style: &str) -> String {
    let after_url = style.split("url(").last().unwrap_or(style);
    let inside = after_url.split(')').next().unwrap_or(after_url);
    inside.replace('"', "")
}

/// Walks every category's listing pages and accumulates the discovered
/// property links.
pub struct PaginationDriver<'a> {
    config: &'a ScraperConfig,
    fetcher: &'a dyn PageFetcher,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(config: &'a ScraperConfig, fetcher: &'a dyn PageFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Crawl all configured categories and assign dense 1-based indices in
    /// final output order (category order, then page order, then in-page
    /// order).
    pub async fn crawl_all(&self) -> Vec<ListingReference> {
        let mut collected: Vec<(ListingCard, Category)> = Vec::new();
        for &category in &self.config.categories {
            self.crawl_category(category, &mut collected).await;
        }

        collected
            .into_iter()
            .enumerate()
            .map(|(i, (card, category))| ListingReference {
                index: i as u32 + 1,
                url: card.url,
                image_url: card.image_url,
                category,
            })
            .collect()
    }

    /// Fetch pages 1, 2, ... for one category until the portal runs out.
    ///
    /// Termination: a page with no cards ends the category, and so does a
    /// page whose URL set equals the previous page's (the portal redirects
    /// overflow page numbers back to a stable page instead of returning an
    /// empty one). A page oscillating between two distinct non-empty sets
    /// would never trigger either condition; the portal does not do that.
    async fn crawl_category(&self, category: Category, out: &mut Vec<(ListingCard, Category)>) {
        let mut page = 1u32;
        let mut previous_urls: HashSet<String> = HashSet::new();

        loop {
            let page_url = self.config.listing_page_url(category, page);
            info!("Scraping page {page} for {category}: {page_url}");

            // A failed or unparseable page counts as an empty one.
            let cards = match self.fetcher.fetch(&page_url).await {
                Ok(body) => parse_listing_page(&body, &self.config.site_root),
                Err(e) => {
                    warn!("Listing page {page_url} failed: {e:#}");
                    Vec::new()
                }
            };

            let current_urls: HashSet<String> = cards.iter().map(|c| c.url.clone()).collect();
            if cards.is_empty() || current_urls == previous_urls {
                info!("Page {page} for {category} is empty or repeats the previous page, done");
                break;
            }

            out.extend(cards.into_iter().map(|card| (card, category)));
            previous_urls = current_urls;
            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::traits::testing::StubFetcher;

    const SITE: &str = "https://site.test";

    fn listing_page(cards: &[(&str, &str)]) -> String {
        let mut body = String::from(r#"<html><body><div class="row mt-4 properties-to-display">"#);
        for (href, img) in cards {
            body.push_str(&format!(
                r#"<div class="property-card"><a href="{href}">ver</a><div class="img-preview" style="background-image: url(&quot;{img}&quot;);"></div></div>"#
            ));
        }
        body.push_str("</div></body></html>");
        body
    }

    fn empty_page() -> String {
        "<html><body><div class=\"otra-cosa\"></div></body></html>".to_string()
    }

    fn sale_only_config() -> ScraperConfig {
        ScraperConfig {
            categories: vec![Category::Sale],
            site_root: SITE.to_string(),
            ..ScraperConfig::default()
        }
    }

    #[test]
    fn page_without_container_yields_no_cards() {
        assert!(parse_listing_page(&empty_page(), SITE).is_empty());
    }

    #[test]
    fn cards_resolve_relative_links_and_inline_images() {
        let html = listing_page(&[("/propiedad/1", "https://cdn.test/1.jpg")]);
        let cards = parse_listing_page(&html, SITE);
        assert_eq!(
            cards,
            vec![ListingCard {
                url: "https://site.test/propiedad/1".to_string(),
                image_url: "https://cdn.test/1.jpg".to_string(),
            }]
        );
    }

    #[test]
    fn broken_card_is_skipped_but_rest_of_page_survives() {
        let html = r#"<html><body><div class="row mt-4 properties-to-display">
              <div class="property-card"><span>sin enlace</span></div>
              <div class="property-card"><a href="/propiedad/2">ver</a>
                <div class="img-preview" style="background-image: url('https://cdn.test/2.jpg');"></div>
              </div>
            </div></body></html>"#;
        let cards = parse_listing_page(html, SITE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].url, "https://site.test/propiedad/2");
    }

    #[test]
    fn style_without_url_function_degrades_to_raw_value() {
        assert_eq!(image_url_from_style("ninguna-imagen"), "ninguna-imagen");
        assert_eq!(
            image_url_from_style(r#"background-image: url("https://cdn.test/x.png")"#),
            "https://cdn.test/x.png"
        );
    }

    #[tokio::test]
    async fn stops_on_first_empty_page_and_indexes_from_one() {
        let config = sale_only_config();
        let fetcher = StubFetcher::new([
            (
                config.listing_page_url(Category::Sale, 1),
                listing_page(&[("/p/1", "i1"), ("/p/2", "i2")]),
            ),
            (config.listing_page_url(Category::Sale, 2), empty_page()),
        ]);

        let refs = PaginationDriver::new(&config, &fetcher).crawl_all().await;
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].index, 1);
        assert_eq!(refs[1].index, 2);
        assert!(refs.iter().all(|r| r.category == Category::Sale));
        assert_eq!(refs[0].url, "https://site.test/p/1");
    }

    #[tokio::test]
    async fn repeated_url_set_ends_category_without_duplicates() {
        let config = sale_only_config();
        let page = listing_page(&[("/p/1", "i1"), ("/p/2", "i2")]);
        let fetcher = StubFetcher::new([
            (config.listing_page_url(Category::Sale, 1), page.clone()),
            (config.listing_page_url(Category::Sale, 2), page),
        ]);

        let refs = PaginationDriver::new(&config, &fetcher).crawl_all().await;
        let urls: Vec<&str> = refs.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://site.test/p/1", "https://site.test/p/2"]);
    }

    #[tokio::test]
    async fn fetch_failure_counts_as_empty_page() {
        let config = sale_only_config();
        let fetcher = StubFetcher::new([(
            config.listing_page_url(Category::Sale, 1),
            listing_page(&[("/p/1", "i1")]),
        )]);
        // Page 2 has no canned body, so the fetch fails and ends the crawl.
        let refs = PaginationDriver::new(&config, &fetcher).crawl_all().await;
        assert_eq!(refs.len(), 1);
    }

    #[tokio::test]
    async fn categories_are_crawled_in_order() {
        let config = ScraperConfig::default();
        let fetcher = StubFetcher::new([
            (
                config.listing_page_url(Category::Sale, 1),
                listing_page(&[("/venta/1", "iv")]),
            ),
            (config.listing_page_url(Category::Sale, 2), empty_page()),
            (
                config.listing_page_url(Category::Rent, 1),
                listing_page(&[("/arriendo/1", "ia")]),
            ),
            (config.listing_page_url(Category::Rent, 2), empty_page()),
        ]);

        let refs = PaginationDriver::new(&config, &fetcher).crawl_all().await;
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].category, Category::Sale);
        assert_eq!(refs[1].category, Category::Rent);
        assert_eq!(refs[1].index, 2);
    }
}
