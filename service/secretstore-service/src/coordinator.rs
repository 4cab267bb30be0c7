//! Secret-Store Coordinator (C8): orchestrates create/get/update/delete/share
//! across identities, guardians, and stores. Every public method runs in one
//! transaction, giving the stores↔guardians relationship an all-or-nothing
//! effect (§5).

use crate::db::Database;
use crate::error::{Result, ServiceError};
use crate::{guardian_manager, identity_manager, store_dao};
use rand::{rngs::OsRng, RngCore};
use secretstore_crypto::{policy, store_cipher};
use secretstore_model::{EncryptedStore, PublicIdentity, Store};

pub struct Coordinator<'a> {
    db: Database,
    agent: &'a dyn secretstore_crypto::SshAgent,
}

impl<'a> Coordinator<'a> {
    pub fn new(db: Database, agent: &'a dyn secretstore_crypto::SshAgent) -> Self {
        Self { db, agent }
    }

    /// Rebinds the same underlying database to a different agent handle —
    /// what happens in practice when the CLI is invoked again later with a
    /// different SSH agent present.
    pub fn with_agent<'b>(self, agent: &'b dyn secretstore_crypto::SshAgent) -> Coordinator<'b> {
        Coordinator { db: self.db, agent }
    }

    pub fn new_store(&mut self, store: &Store) -> Result<()> {
        policy::verify_name(&store.name).map_err(ServiceError::Crypto)?;

        let owners = identity_manager::get_identities_based_ssh_agent(&self.db.conn, self.agent)?;
        if owners.is_empty() {
            return Err(ServiceError::NoIdentityForStoreFound(store.name.clone()));
        }

        let mut data_key = [0u8; 32];
        OsRng.fill_bytes(&mut data_key);
        let nonce = fresh_nonce();
        let ciphertext = seal_payload(store, &data_key, &nonce)?;

        let tx = self.db.conn.transaction()?;
        store_dao::save(
            &tx,
            &EncryptedStore {
                name: store.name.clone(),
                ciphertext,
                nonce,
            },
        )?;
        for owner in &owners {
            create_guardian_for(&tx, &store.name, owner, &data_key)?;
        }
        tx.commit()?;
        tracing::info!(store = %store.name, guardians = owners.len(), "created store");
        Ok(())
    }

    pub fn get_encrypted_store(&mut self, name: &str) -> Result<Option<EncryptedStore>> {
        let tx = self.db.conn.transaction()?;
        let found = store_dao::find(&tx, name)?;
        tx.commit()?;
        Ok(found)
    }

    pub fn get_store(&mut self, name: &str) -> Result<Option<Store>> {
        let tx = self.db.conn.transaction()?;
        let Some(encrypted) = store_dao::find(&tx, name)? else {
            return Ok(None);
        };
        let data_key = resolve_key(&tx, self.agent, name)?;
        let store = open_payload(name, &encrypted, &data_key)?;
        tx.commit()?;
        Ok(Some(store))
    }

    /// Reuses the existing data key, draws a fresh nonce, and re-encrypts.
    /// Never touches the `guardians` table.
    pub fn update_store(&mut self, store: &Store) -> Result<()> {
        let tx = self.db.conn.transaction()?;
        let data_key = resolve_key(&tx, self.agent, &store.name)?;
        let nonce = fresh_nonce();
        let ciphertext = seal_payload(store, &data_key, &nonce)?;
        store_dao::update(
            &tx,
            &EncryptedStore {
                name: store.name.clone(),
                ciphertext,
                nonce,
            },
        )?;
        tx.commit()?;
        tracing::info!(store = %store.name, "updated store");
        Ok(())
    }

    /// Deletes the store row then its guardians; the ordering means a
    /// failure partway through still leaves the operation re-runnable.
    pub fn delete_store(&mut self, name: &str) -> Result<()> {
        let tx = self.db.conn.transaction()?;
        store_dao::delete(&tx, name)?;
        guardian_manager::delete_store_guardians(&tx, name)?;
        tx.commit()?;
        tracing::info!(store = %name, "deleted store");
        Ok(())
    }

    /// Adds a guardian for `target`; never replaces existing guardians.
    pub fn share_store(&mut self, name: &str, target: &PublicIdentity) -> Result<()> {
        let tx = self.db.conn.transaction()?;
        let data_key = resolve_key(&tx, self.agent, name)?;
        create_guardian_for(&tx, name, target, &data_key)?;
        tx.commit()?;
        tracing::info!(store = %name, target = %target.fingerprint, "shared store");
        Ok(())
    }

    /// Names of stores with ≥1 guardian openable by a currently-available
    /// private identity. Does not itself decrypt anything.
    pub fn list_stores_name(&mut self) -> Result<Vec<String>> {
        let owners = identity_manager::get_identities_based_ssh_agent(&self.db.conn, self.agent)?;
        let fingerprints: Vec<String> = owners.into_iter().map(|o| o.fingerprint).collect();
        let tx = self.db.conn.transaction()?;
        let names = guardian_manager::find_store_names_for_fingerprints(&tx, &fingerprints)?;
        tx.commit()?;
        Ok(names)
    }
}

fn create_guardian_for(
    tx: &rusqlite::Connection,
    store_name: &str,
    identity: &PublicIdentity,
    data_key: &[u8; 32],
) -> Result<()> {
    guardian_manager::create_guardian(tx, store_name, identity, data_key)
}

/// Iterates the caller's private identities, asking the guardian manager to
/// open a guardian for each, returning the first success. A guardian that
/// exists but fails to open (tampering) is a fatal error, not a skip.
fn resolve_key(
    tx: &rusqlite::Connection,
    agent: &dyn secretstore_crypto::SshAgent,
    store_name: &str,
) -> Result<[u8; 32]> {
    for identity in identity_manager::get_private_identities(tx, agent)? {
        let identity = identity?;
        if let Some(key) = guardian_manager::open(tx, store_name, &identity)? {
            return Ok(key);
        }
    }
    Err(ServiceError::NoIdentityForStoreFound(store_name.to_string()))
}

fn fresh_nonce() -> [u8; 8] {
    let mut nonce = [0u8; 8];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

fn seal_payload(store: &Store, data_key: &[u8; 32], nonce: &[u8; 8]) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec(&store.data)
        .map_err(|e| ServiceError::CryptoFailure(format!("serializing store payload: {e}")))?;
    store_cipher::apply_keystream(data_key, nonce, &mut bytes);
    Ok(bytes)
}

fn open_payload(name: &str, encrypted: &EncryptedStore, data_key: &[u8; 32]) -> Result<Store> {
    let mut bytes = encrypted.ciphertext.clone();
    store_cipher::apply_keystream(data_key, &encrypted.nonce, &mut bytes);
    let data = serde_json::from_slice(&bytes)
        .map_err(|e| ServiceError::CryptoFailure(format!("decrypted store payload: {e}")))?;
    Ok(Store::new(name, data))
}
