use rusqlite::Connection;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{AppError, AppResult};

// Thread-local connection slot, tagged with the path it was opened for.
thread_local! {
    static DB_CONN: RefCell<Option<(PathBuf, Connection)>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Provides a mutable connection to the closure. The connection is opened
    /// on first use per thread, and reopened if a different database was used
    /// on this thread last.
    pub fn with_conn<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();

                let stale = !matches!(slot.as_ref(), Some((path, _)) if *path == self.path);
                if stale {
                    let conn = Connection::open(&self.path).map_err(|e| {
                        AppError::DbSetup(format!("Open DB {} failed: {e}", self.path.display()))
                    })?;
                    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                    *slot = Some((self.path.clone(), conn));
                }

                match slot.as_mut() {
                    Some((_, conn)) => f(conn),
                    None => Err(AppError::DbSetup("connection slot empty".to_string())),
                }
            })
            .map_err(|_| AppError::DbSetup("thread-local connection unavailable".to_string()))?
    }
}

/// Initialize database from a SQL schema file
pub fn init_db(db: &Database, schema_path: impl AsRef<Path>) -> AppResult<()> {
    let schema_path = schema_path.as_ref();
    let schema_sql = fs::read_to_string(schema_path).map_err(|e| {
        AppError::DbSetup(format!(
            "Failed to read schema file {}: {e}",
            schema_path.display()
        ))
    })?;

    db.with_conn(|conn| {
        conn.execute_batch(&schema_sql)
            .map_err(|e| AppError::DbSetup(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })?;

    info!(schema = %schema_path.display(), db = %db.path().display(), "database initialized");
    Ok(())
}
