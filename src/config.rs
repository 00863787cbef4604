use crate::models::Category;
use std::path::PathBuf;
use std::time::Duration;

/// Fixed constants of a scrape run. Passed explicitly into the driver
/// components instead of living as globals.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Listing index page, paginated with `?page={n}&&bussines_type={param}`.
    pub base_url: String,
    /// Prefix for the relative links found on property cards.
    pub site_root: String,
    /// Categories to paginate through, in crawl order.
    pub categories: Vec<Category>,
    /// Pause between consecutive detail fetches.
    pub request_delay: Duration,
    /// Per-request timeout for all HTTP fetches.
    pub http_timeout: Duration,
    /// User agent sent with every request (site and geocoder alike).
    pub user_agent: String,
    /// Nominatim reverse-geocoding endpoint.
    pub geocode_url: String,
    /// `zoom` parameter of the reverse lookup (18 = building level).
    pub geocode_zoom: u8,
    /// Intermediate dataset written by the URL stage.
    pub listing_file: PathBuf,
    /// Historical dataset maintained by the detail stage.
    pub history_file: PathBuf,
    /// Crawl only the first N listing references when set. Used for
    /// controlled runs against the live site.
    pub detail_limit: Option<usize>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.arrendamientossantafe.com/propiedades/".to_string(),
            site_root: "https://www.arrendamientossantafe.com".to_string(),
            categories: vec![Category::Sale, Category::Rent],
            request_delay: Duration::from_secs(1),
            http_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            geocode_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            geocode_zoom: 18,
            listing_file: PathBuf::from("urls_propiedades_paginas.csv"),
            history_file: PathBuf::from("detalles_propiedades_completo.csv"),
            detail_limit: Some(5),
        }
    }
}

impl ScraperConfig {
    /// URL of one listing page for a category. The doubled `&` matches the
    /// portal's own pagination links.
    pub fn listing_page_url(&self, category: Category, page: u32) -> String {
        format!(
            "{}?page={}&&bussines_type={}",
            self.base_url,
            page,
            category.query_param()
        )
    }
}
