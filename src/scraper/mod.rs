pub mod extractor;
pub mod layout;
pub mod scraper;
mod scraper_error;

pub use self::extractor::{ListingExtractor, MissingPricePolicy};
pub use self::layout::ListingLayout;
pub use self::scraper::{parse_page_url, DocumentSource, PageFetcher, DEFAULT_USER_AGENT};
pub use self::scraper_error::{ExtractError, ScraperError};
