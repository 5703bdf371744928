// errors.rs
use thiserror::Error;

use crate::scraper::{ExtractError, ScraperError};

/// Errors originating from the driver and CLI layer or from downstream
/// layers (DB, spreadsheets, extraction).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database Error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database Error: {0}")]
    DbSetup(String),

    #[error("Spreadsheet Error: {0}")]
    Xlsx(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Scraper(#[from] ScraperError),
}

pub type AppResult<T> = Result<T, AppError>;
