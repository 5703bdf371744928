// scraper.rs
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, REFERER};
use reqwest::StatusCode;
use scraper::Html;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use crate::scraper::ScraperError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Anything that can turn a page URL into a parsed document.
pub trait DocumentSource {
    fn fetch_document(&self, url: &Url) -> Result<Html, ScraperError>;
}

/// Plain HTTP fetcher. One request per page, no retries.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn fetch_html(&self, url: &Url) -> Result<String, ScraperError> {
        let start = Instant::now();

        let resp = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = resp
            .text()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        check_response(url, status, content_type.as_deref())?;

        info!(%url, bytes = text.len(), elapsed = ?start.elapsed(), "page fetched");
        Ok(text)
    }
}

impl DocumentSource for PageFetcher {
    fn fetch_document(&self, url: &Url) -> Result<Html, ScraperError> {
        let html = self.fetch_html(url)?;
        parse_document(&html)
    }
}

/// Rejects non-2xx responses and bodies that aren't HTML. A missing
/// content-type is accepted.
pub fn check_response(
    url: &Url,
    status: StatusCode,
    content_type: Option<&str>,
) -> Result<(), ScraperError> {
    if !status.is_success() {
        return Err(ScraperError::Network(format!("HTTP {status} for {url}")));
    }

    if let Some(ct) = content_type {
        if !ct.to_ascii_lowercase().contains("html") {
            return Err(ScraperError::HtmlParse(format!(
                "expected HTML from {url}, got content-type '{ct}'"
            )));
        }
    }

    Ok(())
}

/// html5ever accepts anything, so the only markup failure is having none.
pub fn parse_document(html: &str) -> Result<Html, ScraperError> {
    if html.trim().is_empty() {
        return Err(ScraperError::HtmlParse("empty document".to_string()));
    }

    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        debug!(errors = document.errors.len(), "document parsed with recoverable errors");
    }

    Ok(document)
}

/// Accepts only absolute http(s) URLs.
pub fn parse_page_url(raw: &str) -> Result<Url, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
