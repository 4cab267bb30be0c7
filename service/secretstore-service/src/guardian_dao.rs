//! Guardian persistence (C5): `(store_name, identity_fingerprint)` → wrapped
//! key rows.

use crate::error::{Result, ServiceError};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use secretstore_model::Guardian;

pub fn find(conn: &Connection, store_name: &str, fingerprint: &str) -> Result<Option<Guardian>> {
    conn.query_row(
        "SELECT store_name, identity_fingerprint, aead_enc, enc_key FROM guardians \
         WHERE store_name = ?1 AND identity_fingerprint = ?2",
        params![store_name, fingerprint],
        row_from_sql,
    )
    .optional()
    .map_err(ServiceError::from)
}

pub fn save(conn: &Connection, guardian: &Guardian) -> Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO guardians (store_name, identity_fingerprint, aead_enc, enc_key) \
         VALUES (?1, ?2, ?3, ?4)",
        params![
            guardian.store_name,
            guardian.identity_fingerprint,
            guardian.aead_enc,
            guardian.enc_key
        ],
    )?;
    if inserted == 0 {
        return Err(ServiceError::Duplicate {
            kind: "guardian",
            key: format!("{}/{}", guardian.store_name, guardian.identity_fingerprint),
        });
    }
    Ok(())
}

/// Distinct store names with at least one guardian matching `fingerprints`.
pub fn find_store_names(conn: &Connection, fingerprints: &[String]) -> Result<Vec<String>> {
    if fingerprints.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = fingerprints.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let query = format!(
        "SELECT DISTINCT store_name FROM guardians WHERE identity_fingerprint IN ({placeholders})"
    );
    let mut stmt = conn.prepare(&query)?;
    let names = stmt
        .query_map(params_from_iter(fingerprints.iter()), |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

pub fn delete_store_guardians(conn: &Connection, store_name: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM guardians WHERE store_name = ?1",
        params![store_name],
    )?;
    Ok(())
}

fn row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Guardian> {
    Ok(Guardian {
        store_name: row.get(0)?,
        identity_fingerprint: row.get(1)?,
        aead_enc: row.get(2)?,
        enc_key: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn guardian(store: &str, fp: &str) -> Guardian {
        Guardian {
            store_name: store.to_string(),
            identity_fingerprint: fp.to_string(),
            aead_enc: vec![1; 65],
            enc_key: vec![2; 48],
        }
    }

    #[test]
    fn save_then_find() {
        let db = Database::open_in_memory().unwrap();
        save(&db.conn, &guardian("gmail", "fp1")).unwrap();

        assert!(find(&db.conn, "gmail", "fp1").unwrap().is_some());
        assert!(find(&db.conn, "gmail", "fp2").unwrap().is_none());
    }

    #[test]
    fn duplicate_pk_fails() {
        let db = Database::open_in_memory().unwrap();
        save(&db.conn, &guardian("gmail", "fp1")).unwrap();
        assert!(matches!(
            save(&db.conn, &guardian("gmail", "fp1")),
            Err(ServiceError::Duplicate { .. })
        ));
    }

    #[test]
    fn find_store_names_and_delete() {
        let db = Database::open_in_memory().unwrap();
        save(&db.conn, &guardian("gmail", "fp1")).unwrap();
        save(&db.conn, &guardian("github", "fp1")).unwrap();
        save(&db.conn, &guardian("github", "fp2")).unwrap();

        let mut names = find_store_names(&db.conn, &["fp1".to_string()]).unwrap();
        names.sort();
        assert_eq!(names, vec!["github".to_string(), "gmail".to_string()]);

        delete_store_guardians(&db.conn, "github").unwrap();
        assert!(find(&db.conn, "github", "fp1").unwrap().is_none());
        assert!(find(&db.conn, "github", "fp2").unwrap().is_none());
        assert!(find(&db.conn, "gmail", "fp1").unwrap().is_some());
    }
}
