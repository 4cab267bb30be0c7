//! Encrypted store persistence (C7): `{name, ciphertext, nonce}` rows.

use crate::error::{Result, ServiceError};
use rusqlite::{params, Connection, OptionalExtension};
use secretstore_model::EncryptedStore;

pub fn save(conn: &Connection, store: &EncryptedStore) -> Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO store (name, ciphertext, nonce) VALUES (?1, ?2, ?3)",
        params![store.name, store.ciphertext, store.nonce.as_slice()],
    )?;
    if inserted == 0 {
        return Err(ServiceError::NameAlreadyUsed(store.name.clone()));
    }
    Ok(())
}

pub fn find(conn: &Connection, name: &str) -> Result<Option<EncryptedStore>> {
    conn.query_row(
        "SELECT name, ciphertext, nonce FROM store WHERE name = ?1",
        params![name],
        row_from_sql,
    )
    .optional()
    .map_err(ServiceError::from)
}

pub fn update(conn: &Connection, store: &EncryptedStore) -> Result<()> {
    let updated = conn.execute(
        "UPDATE store SET ciphertext = ?2, nonce = ?3 WHERE name = ?1",
        params![store.name, store.ciphertext, store.nonce.as_slice()],
    )?;
    if updated == 0 {
        return Err(ServiceError::NotFound {
            kind: "store",
            key: store.name.clone(),
        });
    }
    Ok(())
}

pub fn delete(conn: &Connection, name: &str) -> Result<()> {
    conn.execute("DELETE FROM store WHERE name = ?1", params![name])?;
    Ok(())
}

pub fn list_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM store")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

fn row_from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<EncryptedStore> {
    let nonce_vec: Vec<u8> = row.get(2)?;
    let mut nonce = [0u8; 8];
    if nonce_vec.len() == 8 {
        nonce.copy_from_slice(&nonce_vec);
    }
    Ok(EncryptedStore {
        name: row.get(0)?,
        ciphertext: row.get(1)?,
        nonce,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn store(name: &str, nonce_byte: u8) -> EncryptedStore {
        EncryptedStore {
            name: name.to_string(),
            ciphertext: vec![9, 9, 9],
            nonce: [nonce_byte; 8],
        }
    }

    #[test]
    fn save_find_update_delete() {
        let db = Database::open_in_memory().unwrap();
        save(&db.conn, &store("gmail", 1)).unwrap();

        let found = find(&db.conn, "gmail").unwrap().unwrap();
        assert_eq!(found.nonce, [1u8; 8]);

        update(&db.conn, &store("gmail", 2)).unwrap();
        let found = find(&db.conn, "gmail").unwrap().unwrap();
        assert_eq!(found.nonce, [2u8; 8]);

        delete(&db.conn, "gmail").unwrap();
        assert!(find(&db.conn, "gmail").unwrap().is_none());
    }

    #[test]
    fn saving_duplicate_name_fails() {
        let db = Database::open_in_memory().unwrap();
        save(&db.conn, &store("gmail", 1)).unwrap();
        assert!(matches!(
            save(&db.conn, &store("gmail", 2)),
            Err(ServiceError::NameAlreadyUsed(_))
        ));
    }

    #[test]
    fn updating_missing_store_fails() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            update(&db.conn, &store("gmail", 1)),
            Err(ServiceError::NotFound { .. })
        ));
    }
}
