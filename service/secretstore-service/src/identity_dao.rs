//! Identity persistence (C3): pure SQL CRUD over `identities`.

use crate::error::{Result, ServiceError};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

/// The raw, on-disk row shape (§3) — `private_key` is `seed(16) ‖
/// PKCS#8-encrypted-DER` and is never decoded here.
#[derive(Debug, Clone)]
pub struct IdentityRow {
    pub fingerprint: String,
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
}

pub fn insert(conn: &Connection, row: &IdentityRow) -> Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO identities (fingerprint, public_key, private_key) VALUES (?1, ?2, ?3)",
        params![row.fingerprint, row.public_key, row.private_key],
    )?;
    if inserted == 0 {
        return Err(ServiceError::Duplicate {
            kind: "identity",
            key: row.fingerprint.clone(),
        });
    }
    Ok(())
}

pub fn find(conn: &Connection, fingerprint: &str) -> Result<Option<IdentityRow>> {
    conn.query_row(
        "SELECT fingerprint, public_key, private_key FROM identities WHERE fingerprint = ?1",
        params![fingerprint],
        row_from_sql,
    )
    .optional()
    .map_err(ServiceError::from)
}

pub fn find_many(conn: &Connection, fingerprints: &[String]) -> Result<Vec<IdentityRow>> {
    if fingerprints.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = fingerprints.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let query = format!(
        "SELECT fingerprint, public_key, private_key FROM identities WHERE fingerprint IN ({placeholders})"
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt
        .query_map(params_from_iter(fingerprints.iter()), row_from_sql)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn find_all(conn: &Connection) -> Result<Vec<IdentityRow>> {
    let mut stmt = conn.prepare("SELECT fingerprint, public_key, private_key FROM identities")?;
    let rows = stmt
        .query_map([], row_from_sql)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<IdentityRow> {
    Ok(IdentityRow {
        fingerprint: row.get(0)?,
        public_key: row.get(1)?,
        private_key: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn row(fp: &str) -> IdentityRow {
        IdentityRow {
            fingerprint: fp.to_string(),
            public_key: vec![1, 2, 3],
            private_key: vec![4, 5, 6],
        }
    }

    #[test]
    fn insert_then_find() {
        let db = Database::open_in_memory().unwrap();
        insert(&db.conn, &row("fp1")).unwrap();

        let found = find(&db.conn, "fp1").unwrap().unwrap();
        assert_eq!(found.public_key, vec![1, 2, 3]);
        assert!(find(&db.conn, "missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_insert_fails() {
        let db = Database::open_in_memory().unwrap();
        insert(&db.conn, &row("fp1")).unwrap();
        assert!(matches!(
            insert(&db.conn, &row("fp1")),
            Err(ServiceError::Duplicate { .. })
        ));
    }

    #[test]
    fn find_many_and_find_all() {
        let db = Database::open_in_memory().unwrap();
        insert(&db.conn, &row("fp1")).unwrap();
        insert(&db.conn, &row("fp2")).unwrap();
        insert(&db.conn, &row("fp3")).unwrap();

        let some = find_many(&db.conn, &["fp1".to_string(), "fp3".to_string()]).unwrap();
        assert_eq!(some.len(), 2);

        let all = find_all(&db.conn).unwrap();
        assert_eq!(all.len(), 3);
    }
}
