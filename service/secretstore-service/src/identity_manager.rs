//! Identity Manager (C4): identity lifecycle on top of the identity DAO.

use crate::error::{Result, ServiceError};
use crate::identity_dao::{self, IdentityRow};
use rusqlite::Connection;
use secretstore_crypto::agent::{AgentKey, SshAgent};
use secretstore_crypto::{identity_cipher, kdf::EncryptionPack};
use secretstore_model::{PrivateIdentity, PublicIdentity};
use zeroize::Zeroizing;

fn to_public(row: &IdentityRow) -> PublicIdentity {
    PublicIdentity {
        fingerprint: row.fingerprint.clone(),
        public_key_der: row.public_key.clone(),
        public_key_raw: der_to_raw(&row.public_key),
    }
}

/// The DER we store is SubjectPublicKeyInfo; the HPKE KEM wants the raw
/// SEC1 point. `p256::PublicKey` round-trips both, so decode once here.
fn der_to_raw(der: &[u8]) -> Vec<u8> {
    use p256::pkcs8::DecodePublicKey;
    p256::PublicKey::from_public_key_der(der)
        .map(|pk| identity_cipher::public_key_to_raw(&pk))
        .unwrap_or_default()
}

/// Creates one identity per agent key of a supported algorithm not already
/// known, returning the newly created fingerprints. Fails with
/// `NoSshKey`-shaped `NotFound` if the agent has no supported key.
pub fn create_identities(conn: &Connection, agent: &dyn SshAgent) -> Result<Vec<String>> {
    let keys = agent.list_keys().map_err(secretstore_crypto::CryptoError::from)?;

    let mut created = Vec::new();
    for key in &keys {
        if identity_dao::find(conn, &key.fingerprint)?.is_some() {
            continue;
        }

        let (secret, public) = identity_cipher::generate_keypair();
        let public_der = identity_cipher::encode_public_key(&public)
            .map_err(ServiceError::Crypto)?;

        let (pack, seed) = EncryptionPack::new(agent, key).map_err(ServiceError::Crypto)?;
        let encrypted_sk = identity_cipher::encrypt_private_key(&secret, &*pack.wrap_key)
            .map_err(ServiceError::Crypto)?;

        let mut blob = Vec::with_capacity(16 + encrypted_sk.len());
        blob.extend_from_slice(&seed);
        blob.extend_from_slice(&encrypted_sk);

        identity_dao::insert(
            conn,
            &IdentityRow {
                fingerprint: key.fingerprint.clone(),
                public_key: public_der,
                private_key: blob,
            },
        )?;
        tracing::info!(fingerprint = %key.fingerprint, "created identity");
        created.push(key.fingerprint.clone());
    }

    Ok(created)
}

pub fn get_identities(conn: &Connection) -> Result<Vec<PublicIdentity>> {
    Ok(identity_dao::find_all(conn)?.iter().map(to_public).collect())
}

pub fn get_identity(conn: &Connection, fingerprint: &str) -> Result<Option<PublicIdentity>> {
    Ok(identity_dao::find(conn, fingerprint)?.as_ref().map(to_public))
}

/// Keys currently present in the agent, or an empty list if the agent has
/// none. Distinct from a raw `agent.list_keys()` call: an agent with no
/// supported key is a legitimate "caller owns nothing right now" state for
/// every read path, not a hard failure — only [`create_identities`] treats
/// it as one (`NoSshKey`, §4.4).
fn present_keys(agent: &dyn SshAgent) -> Result<Vec<AgentKey>> {
    match agent.list_keys() {
        Ok(keys) => Ok(keys),
        Err(secretstore_crypto::error::AgentError::NoKeys) => Ok(Vec::new()),
        Err(e) => Err(secretstore_crypto::CryptoError::from(e).into()),
    }
}

pub fn get_identities_based_ssh_agent(
    conn: &Connection,
    agent: &dyn SshAgent,
) -> Result<Vec<PublicIdentity>> {
    let keys = present_keys(agent)?;
    let fingerprints: Vec<String> = keys.iter().map(|k| k.fingerprint.clone()).collect();
    Ok(identity_dao::find_many(conn, &fingerprints)?
        .iter()
        .map(to_public)
        .collect())
}

/// Lazily materializes private identities for every agent-matched row.
/// Each `next()` call costs exactly one agent signing round trip, so a
/// caller that only needs the first match (the coordinator's key
/// resolution) never pays for the rest.
pub struct PrivateIdentities<'a> {
    agent: &'a dyn SshAgent,
    remaining: std::vec::IntoIter<(AgentKey, IdentityRow)>,
}

impl<'a> Iterator for PrivateIdentities<'a> {
    type Item = Result<PrivateIdentity>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, row) = self.remaining.next()?;
        Some(decrypt_one(self.agent, &key, &row))
    }
}

fn decrypt_one(agent: &dyn SshAgent, key: &AgentKey, row: &IdentityRow) -> Result<PrivateIdentity> {
    if row.private_key.len() < 16 {
        return Err(ServiceError::CryptoFailure(
            "identity private key blob shorter than the seed".into(),
        ));
    }
    let (seed_bytes, encrypted_sk) = row.private_key.split_at(16);
    let mut seed = [0u8; 16];
    seed.copy_from_slice(seed_bytes);

    let pack = EncryptionPack::from_seed(agent, key, &seed).map_err(ServiceError::Crypto)?;
    let secret = identity_cipher::decrypt_private_key(encrypted_sk, &*pack.wrap_key)
        .map_err(ServiceError::Crypto)?;

    Ok(PrivateIdentity {
        public: to_public(row),
        private_key_raw: Zeroizing::new(identity_cipher::secret_key_to_raw(&secret)),
    })
}

pub fn get_private_identities<'a>(
    conn: &Connection,
    agent: &'a dyn SshAgent,
) -> Result<PrivateIdentities<'a>> {
    let keys = present_keys(agent)?;
    let fingerprints: Vec<String> = keys.iter().map(|k| k.fingerprint.clone()).collect();
    let rows = identity_dao::find_many(conn, &fingerprints)?;

    let mut keys_by_fp = std::collections::HashMap::new();
    for key in keys {
        keys_by_fp.insert(key.fingerprint.clone(), key);
    }

    let pairs: Vec<(AgentKey, IdentityRow)> = rows
        .into_iter()
        .filter_map(|row| keys_by_fp.get(&row.fingerprint).cloned().map(|k| (k, row)))
        .collect();

    Ok(PrivateIdentities {
        agent,
        remaining: pairs.into_iter(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use secretstore_crypto::agent::fake::FakeSshAgent;

    #[test]
    fn create_then_list_and_recover_private() {
        let db = Database::open_in_memory().unwrap();
        let agent = FakeSshAgent::single("alice");

        let created = create_identities(&db.conn, &agent).unwrap();
        assert_eq!(created.len(), 1);

        // Syncing again creates nothing new.
        let created_again = create_identities(&db.conn, &agent).unwrap();
        assert!(created_again.is_empty());

        let all = get_identities(&db.conn).unwrap();
        assert_eq!(all.len(), 1);

        let mine = get_identities_based_ssh_agent(&db.conn, &agent).unwrap();
        assert_eq!(mine.len(), 1);

        let privates: Vec<_> = get_private_identities(&db.conn, &agent)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(privates.len(), 1);
        assert_eq!(privates[0].fingerprint(), all[0].fingerprint);
    }

    #[test]
    fn empty_agent_yields_no_private_identities() {
        let db = Database::open_in_memory().unwrap();
        let agent = FakeSshAgent::single("alice");
        create_identities(&db.conn, &agent).unwrap();

        let empty_agent = FakeSshAgent::empty();
        let privates: Vec<_> = get_private_identities(&db.conn, &empty_agent)
            .unwrap()
            .collect();
        assert!(privates.is_empty());
    }
}
