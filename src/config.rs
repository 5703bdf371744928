use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AppError, AppResult};
use crate::scraper::{MissingPricePolicy, DEFAULT_USER_AGENT};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub schema_path: PathBuf,
    pub timeout: Duration,
    pub page_delay: Duration,
    pub missing_price: MissingPricePolicy,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("listings.sqlite3"),
            schema_path: PathBuf::from("sql/schema.sql"),
            timeout: Duration::from_secs(30),
            page_delay: Duration::from_secs(2),
            missing_price: MissingPricePolicy::AbortPage,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if present
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            db_path: lookup("RENT_SCRAPER_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            schema_path: lookup("RENT_SCRAPER_SCHEMA")
                .map(PathBuf::from)
                .unwrap_or(defaults.schema_path),
            timeout: match lookup("RENT_SCRAPER_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(parse_var("RENT_SCRAPER_TIMEOUT_SECS", &v)?),
                None => defaults.timeout,
            },
            page_delay: match lookup("RENT_SCRAPER_PAGE_DELAY_SECS") {
                Some(v) => Duration::from_secs(parse_var("RENT_SCRAPER_PAGE_DELAY_SECS", &v)?),
                None => defaults.page_delay,
            },
            missing_price: match lookup("RENT_SCRAPER_MISSING_PRICE") {
                Some(v) => v.parse().map_err(AppError::Config)?,
                None => defaults.missing_price,
            },
            user_agent: lookup("RENT_SCRAPER_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key} must be a valid number, got '{value}'")))
}
