// src/tests/db_tests.rs

use super::utils::make_db;
use crate::db::listings::{all_listings, count_listings, listings_for_page, save_batch};
use crate::db::pages::{add_page, get_page, list_pages};
use crate::db::scrapes::{end_scrape_run, recent_scrape_runs, start_scrape_run};
use crate::domain::{PageId, ABSENT};
use crate::errors::AppError;
use crate::scraper::extractor::{assemble, ListingFields, SizeFields};
use crate::scraper::ScraperError;

fn fields(rent: i64, bedrooms: Option<i64>, sq_feet: Option<i64>, location: &str) -> ListingFields {
    ListingFields {
        rent,
        size: SizeFields { bedrooms, sq_feet },
        location: location.to_string(),
    }
}

#[test]
fn add_page_is_idempotent_per_url() {
    let db = make_db("pages_idempotent");

    let first = add_page(&db, "https://example.org/search/apa").unwrap();
    let again = add_page(&db, "https://example.org/search/apa").unwrap();
    let other = add_page(&db, "https://example.org/search/apa?s=120").unwrap();

    assert_eq!(first, again);
    assert_ne!(first, other);

    let pages = list_pages(&db).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].id, first);
    assert_eq!(pages[1].url, "https://example.org/search/apa?s=120");
}

#[test]
fn add_page_rejects_non_http_urls() {
    let db = make_db("pages_invalid");

    let err = add_page(&db, "ftp://example.org/listings").unwrap_err();
    assert!(matches!(
        err,
        AppError::Scraper(ScraperError::InvalidUrl { .. })
    ));

    assert!(add_page(&db, "not a url").is_err());
    assert!(list_pages(&db).unwrap().is_empty());
}

#[test]
fn get_page_reports_unknown_ids() {
    let db = make_db("pages_missing");

    let err = get_page(&db, PageId(404)).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn save_batch_appends_rows_in_order() {
    let db = make_db("listings_save");
    let page = add_page(&db, "https://example.org/search/apa").unwrap();

    let batch = assemble(
        page,
        vec![
            fields(1234, Some(2), Some(850), "Downtown"),
            fields(950, Some(3), None, ""),
        ],
    );

    assert_eq!(save_batch(&db, &batch).unwrap(), 2);
    assert_eq!(save_batch(&db, &batch).unwrap(), 2);
    assert_eq!(count_listings(&db).unwrap(), 4);

    let stored = listings_for_page(&db, page).unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[0].record, batch.records()[0]);
    assert_eq!(stored[1].record.sq_feet, ABSENT);
    assert_eq!(stored[1].record.location, "");
}

#[test]
fn listings_are_filtered_by_page() {
    let db = make_db("listings_by_page");
    let a = add_page(&db, "https://example.org/a").unwrap();
    let b = add_page(&db, "https://example.org/b").unwrap();

    save_batch(&db, &assemble(a, vec![fields(1, None, None, "")])).unwrap();
    let second = assemble(b, vec![fields(2, None, None, ""), fields(3, None, None, "")]);
    save_batch(&db, &second).unwrap();

    assert_eq!(listings_for_page(&db, a).unwrap().len(), 1);
    assert_eq!(listings_for_page(&db, b).unwrap().len(), 2);
    assert_eq!(all_listings(&db).unwrap().len(), 3);
}

#[test]
fn failed_batch_writes_nothing() {
    let db = make_db("listings_rollback");

    // No such page: the foreign key rejects the first row.
    let batch = assemble(PageId(999), vec![fields(1, None, None, ""), fields(2, None, None, "")]);

    assert!(save_batch(&db, &batch).is_err());
    assert_eq!(count_listings(&db).unwrap(), 0);
}

#[test]
fn scrape_runs_record_outcomes() {
    let db = make_db("scrape_runs");
    let page = add_page(&db, "https://example.org/search/apa").unwrap();

    let runs = db
        .with_conn(|conn| {
            let ok = start_scrape_run(conn, page, 100)?;
            end_scrape_run(conn, ok, 101, 12, true, None)?;

            let failed = start_scrape_run(conn, page, 200)?;
            end_scrape_run(conn, failed, 201, 0, false, Some("HTTP 503".to_string()))?;

            recent_scrape_runs(conn, 10)
        })
        .unwrap();

    assert_eq!(runs.len(), 2);
    // Newest first.
    assert!(!runs[0].success);
    assert_eq!(runs[0].error_message.as_deref(), Some("HTTP 503"));
    assert!(runs[1].success);
    assert_eq!(runs[1].listings_seen, Some(12));
    assert_eq!(runs[1].finished_at, Some(101));
}

#[test]
fn test_database_file_is_removed_on_drop() {
    let db = make_db("cleanup");
    let path = db.path().to_path_buf();
    add_page(&db, "https://example.org/search/apa").unwrap();
    assert!(path.exists());

    drop(db);
    assert!(!path.exists());
}

#[test]
fn pages_and_runs_serialize_for_json_output() {
    let db = make_db("json_output");
    let page = add_page(&db, "https://example.org/search/apa").unwrap();
    db.with_conn(|conn| {
        let run = start_scrape_run(conn, page, 100)?;
        end_scrape_run(conn, run, 101, 3, true, None)
    })
    .unwrap();

    let pages = serde_json::to_value(list_pages(&db).unwrap()).unwrap();
    assert_eq!(pages[0]["id"], page.0);
    assert_eq!(pages[0]["url"], "https://example.org/search/apa");

    let runs = db.with_conn(|conn| recent_scrape_runs(conn, 5)).unwrap();
    let runs = serde_json::to_value(runs).unwrap();
    assert_eq!(runs[0]["page_id"], page.0);
    assert_eq!(runs[0]["listings_seen"], 3);
    assert_eq!(runs[0]["success"], true);
}
