//! Guardian Manager (C6 orchestration half): wraps HPKE seal/open with
//! persistence.

use crate::error::{Result, ServiceError};
use crate::guardian_dao;
use rusqlite::Connection;
use secretstore_crypto::guardian_cipher;
use secretstore_model::{Guardian, PrivateIdentity, PublicIdentity};

/// Names of stores with at least one guardian addressed to one of
/// `fingerprints`. Takes fingerprints rather than materialized
/// [`PrivateIdentity`] values because answering this question never needs
/// the decrypted private scalar — only which identities are currently
/// agent-backed.
pub fn find_store_names_for_fingerprints(
    conn: &Connection,
    fingerprints: &[String],
) -> Result<Vec<String>> {
    guardian_dao::find_store_names(conn, fingerprints)
}

pub fn create_guardian(
    conn: &Connection,
    store_name: &str,
    identity: &PublicIdentity,
    data_key: &[u8; 32],
) -> Result<()> {
    let (aead_enc, enc_key) =
        guardian_cipher::seal(&identity.public_key_raw, data_key).map_err(ServiceError::Crypto)?;

    guardian_dao::save(
        conn,
        &Guardian {
            store_name: store_name.to_string(),
            identity_fingerprint: identity.fingerprint.clone(),
            aead_enc,
            enc_key,
        },
    )
}

/// Opens the guardian for `store_name` addressed to `identity`, if one
/// exists. Missing is `Ok(None)`; a present-but-unopenable guardian
/// (tampering) is a fatal `CryptoFailure`.
pub fn open(
    conn: &Connection,
    store_name: &str,
    identity: &PrivateIdentity,
) -> Result<Option<[u8; 32]>> {
    let Some(guardian) = guardian_dao::find(conn, store_name, identity.fingerprint())? else {
        return Ok(None);
    };

    let data_key = guardian_cipher::open(
        &identity.private_key_raw,
        &guardian.aead_enc,
        &guardian.enc_key,
    )
    .map_err(|e| ServiceError::CryptoFailure(e.to_string()))?;

    Ok(Some(data_key))
}

pub fn delete_store_guardians(conn: &Connection, store_name: &str) -> Result<()> {
    guardian_dao::delete_store_guardians(conn, store_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::identity_manager;
    use secretstore_crypto::agent::fake::FakeSshAgent;

    #[test]
    fn seal_and_open_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let agent = FakeSshAgent::single("alice");
        identity_manager::create_identities(&db.conn, &agent).unwrap();

        let public = identity_manager::get_identities(&db.conn).unwrap().remove(0);
        let data_key = [5u8; 32];
        create_guardian(&db.conn, "gmail", &public, &data_key).unwrap();

        let private = identity_manager::get_private_identities(&db.conn, &agent)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();

        let opened = open(&db.conn, "gmail", &private).unwrap().unwrap();
        assert_eq!(opened, data_key);
    }

    #[test]
    fn open_missing_guardian_is_none() {
        let db = Database::open_in_memory().unwrap();
        let agent = FakeSshAgent::single("alice");
        identity_manager::create_identities(&db.conn, &agent).unwrap();

        let private = identity_manager::get_private_identities(&db.conn, &agent)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();

        assert!(open(&db.conn, "nonexistent", &private).unwrap().is_none());
    }
}
