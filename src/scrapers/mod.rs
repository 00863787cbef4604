pub mod detail;
pub mod extract;
pub mod geocode;
pub mod listing;
pub mod traits;

pub use detail::DetailCrawler;
pub use extract::FieldExtractor;
pub use geocode::{NominatimClient, ReverseGeocoder};
pub use listing::PaginationDriver;
pub use traits::{HttpFetcher, PageFetcher};
