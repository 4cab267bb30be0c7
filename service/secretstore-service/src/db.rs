//! Thin wrapper around the single SQLite connection backing identities,
//! guardians, and stores. One connection, one file, per §5.

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

const SCHEMA: &str = include_str!("schema.sql");

pub struct Database {
    pub conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exercises the file-backed path used in production (`cli::main`),
    /// distinct from the `:memory:` connection every other test uses.
    #[test]
    fn open_creates_schema_on_a_real_file_and_reopens_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        {
            let db = Database::open(&path).unwrap();
            db.conn
                .execute(
                    "INSERT INTO identities (fingerprint, public_key, private_key) VALUES (?1, ?2, ?3)",
                    rusqlite::params!["fp", vec![1u8], vec![2u8]],
                )
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM identities", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
