// src/tests/config_tests.rs

use crate::config::Config;
use crate::errors::AppError;
use crate::scraper::MissingPricePolicy;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_unset() {
    let config = Config::from_lookup(lookup(&[])).unwrap();

    assert_eq!(config.db_path, PathBuf::from("listings.sqlite3"));
    assert_eq!(config.schema_path, PathBuf::from("sql/schema.sql"));
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.page_delay, Duration::from_secs(2));
    assert_eq!(config.missing_price, MissingPricePolicy::AbortPage);
}

#[test]
fn overrides_are_read() {
    let config = Config::from_lookup(lookup(&[
        ("RENT_SCRAPER_DB", "/tmp/rents.db"),
        ("RENT_SCRAPER_TIMEOUT_SECS", "5"),
        ("RENT_SCRAPER_PAGE_DELAY_SECS", "0"),
        ("RENT_SCRAPER_MISSING_PRICE", "sentinel"),
        ("RENT_SCRAPER_USER_AGENT", "test-agent"),
    ]))
    .unwrap();

    assert_eq!(config.db_path, PathBuf::from("/tmp/rents.db"));
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.page_delay, Duration::ZERO);
    assert_eq!(config.missing_price, MissingPricePolicy::Sentinel);
    assert_eq!(config.user_agent, "test-agent");
}

#[test]
fn invalid_values_are_config_errors() {
    let err = Config::from_lookup(lookup(&[("RENT_SCRAPER_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let err = Config::from_lookup(lookup(&[("RENT_SCRAPER_MISSING_PRICE", "skip")])).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
