use crate::db::connection::{init_db, Database};
use std::ops::Deref;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// A unique file under the temp dir, so tests never share state.
pub fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "{prefix}_{}_{}.{ext}",
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// Test database file that is deleted when the test ends.
pub struct TestDb {
    db: Database,
}

impl Deref for TestDb {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(self.db.path());
    }
}

/// Returns a fresh test database using the production schema
pub fn make_db(prefix: &str) -> TestDb {
    let db = Database::new(temp_path(prefix, "sqlite"));
    init_db(&db, "sql/schema.sql").expect("Failed to initialize DB");
    TestDb { db }
}

/// Search page markup with four listings:
/// 1. two-part size and a neighborhood
/// 2. bedrooms only, no neighborhood
/// 3. footage only
/// 4. no size at all
pub const SEARCH_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<ul class="rows">
  <li class="result-row"><p class="result-info">
    <a class="result-title" href="/apa/1.html">Sunny two bedroom</a>
    <span class="result-meta">
      <span class="result-price">$1,234</span>
      <span class="housing">
                    2br -
                    850ft<sup>2</sup> -
                </span>
      <span class="result-hood"> (Downtown)</span>
    </span>
  </p></li>
  <li class="result-row"><p class="result-info">
    <span class="result-meta">
      <span class="result-price">$950</span>
      <span class="housing">
                    3br -
                </span>
    </span>
  </p></li>
  <li class="result-row"><p class="result-info">
    <span class="result-meta">
      <span class="result-price">$2,100</span>
      <span class="housing">
                    900ft<sup>2</sup> -
                </span>
      <span class="result-hood"> (Lower East Side)</span>
    </span>
  </p></li>
  <li class="result-row"><p class="result-info">
    <span class="result-meta">
      <span class="result-price">$800</span>
      <span class="result-hood">(Uptown)</span>
    </span>
  </p></li>
</ul>
</body></html>"#;

/// Second listing has no price element.
pub const PAGE_WITH_MISSING_PRICE: &str = r#"<html><body>
  <span class="result-meta">
    <span class="result-price">$1,500</span>
    <span class="housing">1br -</span>
  </span>
  <span class="result-meta">
    <span class="housing">2br - 700ft</span>
    <span class="result-hood"> (Midtown)</span>
  </span>
</body></html>"#;

pub const EMPTY_PAGE: &str = r#"<html><body><p class="no-results">Nothing here</p></body></html>"#;
