use chrono::Utc;
use rusqlite::{params, Row};
use tracing::debug;

use crate::db::connection::Database;
use crate::domain::{ListingBatch, ListingRecord, PageId, StoredListing};
use crate::errors::AppResult;

const SELECT_LISTINGS: &str =
    "SELECT id, page_id, rent, bedrooms, sq_feet, location, scraped_at FROM listings";

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<StoredListing> {
    Ok(StoredListing {
        id: row.get(0)?,
        record: ListingRecord {
            source_page_id: PageId(row.get(1)?),
            rent: row.get(2)?,
            bedrooms: row.get(3)?,
            sq_feet: row.get(4)?,
            location: row.get(5)?,
        },
        scraped_at: row.get(6)?,
    })
}

/// Appends a page's batch in one transaction: either every row lands or none.
pub fn save_batch(db: &Database, batch: &ListingBatch) -> AppResult<usize> {
    let now = Utc::now().naive_utc();

    db.with_conn(|conn| {
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO listings (page_id, rent, bedrooms, sq_feet, location, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for record in batch.records() {
                stmt.execute(params![
                    batch.source_page_id().0,
                    record.rent,
                    record.bedrooms,
                    record.sq_feet,
                    record.location,
                    now,
                ])?;
            }
        }

        tx.commit()?;
        debug!(page_id = %batch.source_page_id(), rows = batch.len(), "batch saved");
        Ok(batch.len())
    })
}

pub fn listings_for_page(db: &Database, page_id: PageId) -> AppResult<Vec<StoredListing>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!("{SELECT_LISTINGS} WHERE page_id = ?1 ORDER BY id"))?;
        let rows = stmt.query_map(params![page_id.0], listing_from_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}

pub fn all_listings(db: &Database) -> AppResult<Vec<StoredListing>> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!("{SELECT_LISTINGS} ORDER BY id"))?;
        let rows = stmt.query_map([], listing_from_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}

pub fn count_listings(db: &Database) -> AppResult<i64> {
    db.with_conn(|conn| {
        let n = conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(n)
    })
}
