// runner.rs
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::db::connection::Database;
use crate::db::listings::save_batch;
use crate::db::pages::{get_page, list_pages, Page};
use crate::db::scrapes::{end_scrape_run, start_scrape_run};
use crate::domain::PageId;
use crate::errors::AppResult;
use crate::scraper::{
    parse_page_url, DocumentSource, ListingExtractor, ListingLayout, MissingPricePolicy,
};

const JITTER_MAX_MILLIS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Only this page; all registered pages when `None`.
    pub page_id: Option<PageId>,
    pub page_delay: Duration,
    pub missing_price: MissingPricePolicy,
    pub layout: ListingLayout,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            page_id: None,
            page_delay: Duration::from_secs(2),
            missing_price: MissingPricePolicy::default(),
            layout: ListingLayout::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub page_id: PageId,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeSummary {
    pub pages_attempted: usize,
    pub pages_succeeded: usize,
    pub pages_failed: usize,
    pub listings_saved: usize,
    pub failures: Vec<PageFailure>,
}

/// Fetches, extracts and stores every selected page in order. A failing page
/// is recorded and skipped; only registry or run-log failures abort the run.
pub fn run_scrape(
    db: &Database,
    source: &dyn DocumentSource,
    options: &ScrapeOptions,
) -> AppResult<ScrapeSummary> {
    let extractor = ListingExtractor::new(&options.layout, options.missing_price)?;

    let pages = match options.page_id {
        Some(id) => vec![get_page(db, id)?],
        None => list_pages(db)?,
    };

    info!(pages = pages.len(), policy = %extractor.policy(), "🧵 scrape started");

    let mut summary = ScrapeSummary::default();

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            pause(options.page_delay);
        }

        summary.pages_attempted += 1;
        info!(page_id = %page.id, url = %page.url, "📄 scraping page");

        let run_id =
            db.with_conn(|conn| start_scrape_run(conn, page.id, Utc::now().timestamp()))?;

        match scrape_page(db, source, &extractor, page) {
            Ok(saved) => {
                info!(page_id = %page.id, listings = saved, "✅ page stored");
                summary.pages_succeeded += 1;
                summary.listings_saved += saved;
                db.with_conn(|conn| {
                    end_scrape_run(conn, run_id, Utc::now().timestamp(), saved, true, None)
                })?;
            }
            Err(e) => {
                error!(page_id = %page.id, error = %e, "⚠️ page skipped");
                summary.pages_failed += 1;
                summary.failures.push(PageFailure {
                    page_id: page.id,
                    error: e.to_string(),
                });
                db.with_conn(|conn| {
                    end_scrape_run(
                        conn,
                        run_id,
                        Utc::now().timestamp(),
                        0,
                        false,
                        Some(e.to_string()),
                    )
                })?;
            }
        }
    }

    if summary.pages_failed > 0 {
        warn!(failed = summary.pages_failed, "scrape finished with skipped pages");
    }
    info!(
        attempted = summary.pages_attempted,
        succeeded = summary.pages_succeeded,
        listings = summary.listings_saved,
        "🏁 scrape complete"
    );

    Ok(summary)
}

/// One page end to end. Any error here only skips this page.
pub fn scrape_page(
    db: &Database,
    source: &dyn DocumentSource,
    extractor: &ListingExtractor,
    page: &Page,
) -> AppResult<usize> {
    let url = parse_page_url(&page.url)?;
    let document = source.fetch_document(&url)?;
    let batch = extractor.extract(&document, page.id)?;

    if batch.is_empty() {
        info!(page_id = %page.id, "no listings on page");
        return Ok(0);
    }

    save_batch(db, &batch)
}

fn pause(base: Duration) {
    if base.is_zero() {
        return;
    }
    let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_MILLIS);
    std::thread::sleep(base + Duration::from_millis(jitter));
}
