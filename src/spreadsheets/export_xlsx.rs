use crate::domain::{StoredListing, ABSENT};
use crate::errors::{AppError, AppResult};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Writes listings to an `.xlsx` file. Sentinel values become empty cells.
pub fn export_listings_xlsx(listings: &[StoredListing], path: &Path) -> AppResult<usize> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Headers
    let headers = ["Page ID", "Rent", "Bedrooms", "Sq Feet", "Location", "Scraped At"];

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                AppError::Xlsx(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    // Rows
    for (i, listing) in listings.iter().enumerate() {
        let r = (i + 1) as u32;
        let record = &listing.record;

        worksheet
            .write_number(r, 0, record.source_page_id.0 as f64)
            .map_err(|e| AppError::Xlsx(format!("Failed to write page id: {}", e)))?;

        let numbers = [(1, record.rent), (2, record.bedrooms), (3, record.sq_feet)];
        for (col, value) in numbers {
            if value == ABSENT {
                continue;
            }
            worksheet
                .write_number(r, col, value as f64)
                .map_err(|e| AppError::Xlsx(format!("Failed to write column {col}: {}", e)))?;
        }

        if !record.location.is_empty() {
            worksheet
                .write_string(r, 4, &record.location)
                .map_err(|e| AppError::Xlsx(format!("Failed to write location: {}", e)))?;
        }

        worksheet
            .write_string(r, 5, listing.scraped_at.format("%Y-%m-%d %H:%M:%S").to_string())
            .map_err(|e| AppError::Xlsx(format!("Failed to write scraped_at: {}", e)))?;
    }

    workbook
        .save(path)
        .map_err(|e| AppError::Xlsx(format!("Failed to save workbook: {}", e)))?;

    Ok(listings.len())
}
