use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use crate::db::connection::Database;
use crate::domain::PageId;
use crate::errors::{AppError, AppResult};
use crate::scraper::parse_page_url;

/// A registered search page: `(page_ID, page_url)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: PageId,
    pub url: String,
    pub added_at: NaiveDateTime,
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: PageId(row.get(0)?),
        url: row.get(1)?,
        added_at: row.get(2)?,
    })
}

/// Registers a page URL. Registering the same URL twice returns the
/// existing id.
pub fn add_page(db: &Database, raw_url: &str) -> AppResult<PageId> {
    let url = parse_page_url(raw_url)?;
    let now = Utc::now().naive_utc();

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO webpages (page_url, added_at) VALUES (?1, ?2)
             ON CONFLICT(page_url) DO NOTHING",
            params![url.as_str(), now],
        )?;

        let id: i64 = conn.query_row(
            "SELECT page_ID FROM webpages WHERE page_url = ?1",
            params![url.as_str()],
            |row| row.get(0),
        )?;

        Ok(PageId(id))
    })
}

/// Every registered page, in id order.
pub fn list_pages(db: &Database) -> AppResult<Vec<Page>> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT page_ID, page_url, added_at FROM webpages ORDER BY page_ID")?;

        let rows = stmt.query_map([], page_from_row)?;

        let mut pages = Vec::new();
        for r in rows {
            pages.push(r?);
        }
        Ok(pages)
    })
}

pub fn get_page(db: &Database, id: PageId) -> AppResult<Page> {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT page_ID, page_url, added_at FROM webpages WHERE page_ID = ?1",
            params![id.0],
            page_from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("page {id}")))
    })
}
