use rusqlite::{params, Connection};
use serde::Serialize;

use crate::domain::PageId;
use crate::errors::AppResult;

#[derive(Debug, Serialize)]
pub struct ScrapeRun {
    pub id: i64,
    pub page_id: PageId,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub listings_seen: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

pub fn start_scrape_run(conn: &Connection, page_id: PageId, now: i64) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO scrape_runs (page_id, started_at, success) VALUES (?, ?, 0)",
        params![page_id.0, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn end_scrape_run(
    conn: &Connection,
    run_id: i64,
    now: i64,
    listings: usize,
    success: bool,
    error: Option<String>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE scrape_runs
         SET finished_at = ?, listings_seen = ?, success = ?, error_message = ?
         WHERE id = ?",
        params![now, listings as i64, success, error, run_id],
    )?;
    Ok(())
}

pub fn recent_scrape_runs(conn: &Connection, limit: usize) -> AppResult<Vec<ScrapeRun>> {
    let mut stmt = conn.prepare(
        "SELECT id, page_id, started_at, finished_at, listings_seen, success, error_message
         FROM scrape_runs ORDER BY id DESC LIMIT ?",
    )?;

    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(ScrapeRun {
            id: row.get(0)?,
            page_id: PageId(row.get(1)?),
            started_at: row.get(2)?,
            finished_at: row.get(3)?,
            listings_seen: row.get(4)?,
            success: row.get(5)?,
            error_message: row.get(6)?,
        })
    })?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r?);
    }
    Ok(runs)
}
