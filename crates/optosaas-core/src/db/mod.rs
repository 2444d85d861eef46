//! SQLite persistence for franchises, branches, staff, and patient records.

mod schema;
mod branches;
mod records;
mod staff;

pub use schema::*;
#[allow(unused_imports)]
pub use branches::*;
#[allow(unused_imports)]
pub use records::*;
#[allow(unused_imports)]
pub use staff::*;

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Owned SQLite handle with the dashboard schema applied.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the dashboard database file. On-disk stores run in
    /// WAL mode so report exports can read while record saves are in flight.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        log::debug!("opening dashboard store at {}", path.as_ref().display());
        let conn = Connection::open(path)?;
        conn.query_row("PRAGMA journal_mode=WAL", [], |row| {
            row.get::<_, String>(0)
        })?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory store. Used by the test suites.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Raw connection, for queries the typed accessors do not cover.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction spanning several writes.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"franchises".to_string()));
        assert!(tables.contains(&"branches".to_string()));
        assert!(tables.contains(&"staff".to_string()));
        assert!(tables.contains(&"patient_records".to_string()));
    }

    #[test]
    fn test_open_on_disk_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("optosaas.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());

        let mode: String = db
            .conn()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::open_in_memory().unwrap();
        let result = db.conn().execute(
            "INSERT INTO branches (franchise_id, name) VALUES (999, 'Leeds')",
            [],
        );
        assert!(result.is_err());
    }
}
