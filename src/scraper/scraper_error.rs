use thiserror::Error;

/// Failures of the document source. The extractor is never invoked when
/// one of these is returned for a page.
#[derive(Debug, Clone, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failures of listing extraction for a single page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Price parse error at listing {index}: {}", .raw.as_deref().unwrap_or("<missing>"))]
    PriceParse { index: usize, raw: Option<String> },

    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

impl ExtractError {
    /// Same failure, re-tagged with the listing's position in the page.
    pub fn at_index(self, index: usize) -> Self {
        match self {
            ExtractError::PriceParse { raw, .. } => ExtractError::PriceParse { index, raw },
            other => other,
        }
    }
}
