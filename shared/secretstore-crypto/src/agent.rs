//! SSH agent adapter (C1). Signs arbitrary blobs through a live agent
//! connection; never touches or caches the underlying private key.

use crate::error::AgentError;
use ssh_key::public::KeyData;
use std::path::PathBuf;

/// Algorithms the KDF kit can rely on for deterministic signatures.
///
/// ECDSA keys are enumerated by real agents but are filtered out by
/// [`SshAgent::list_keys`] implementations before they ever reach callers —
/// their randomized signatures would make wrap-key derivation unreproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Ed25519,
    Rsa,
}

/// A key enumerated from the agent, reduced to what the KDF kit needs.
#[derive(Debug, Clone)]
pub struct AgentKey {
    pub fingerprint: String,
    pub algorithm: KeyAlgorithm,
    pub public_key: Vec<u8>,
}

/// Capability consumed by the rest of the crate: sign, and enumerate keys
/// worth signing with. No other agent calls are made.
pub trait SshAgent {
    fn list_keys(&self) -> Result<Vec<AgentKey>, AgentError>;
    fn sign(&self, key: &AgentKey, blob: &[u8]) -> Result<Vec<u8>, AgentError>;
}

fn classify(key_data: &KeyData) -> Option<KeyAlgorithm> {
    match key_data {
        KeyData::Ed25519(_) => Some(KeyAlgorithm::Ed25519),
        KeyData::Rsa(_) => Some(KeyAlgorithm::Rsa),
        _ => None,
    }
}

/// Real adapter talking to the agent over `$SSH_AUTH_SOCK`.
pub struct UnixSshAgent {
    socket: PathBuf,
}

impl UnixSshAgent {
    /// Opens the adapter against the agent socket named by `SSH_AUTH_SOCK`.
    pub fn from_env() -> Result<Self, AgentError> {
        let socket = std::env::var_os("SSH_AUTH_SOCK").ok_or(AgentError::NoAgent)?;
        Ok(Self {
            socket: PathBuf::from(socket),
        })
    }

    fn connect(&self) -> Result<ssh_agent_client_rs::Client, AgentError> {
        ssh_agent_client_rs::Client::connect(&self.socket)
            .map_err(|e| AgentError::Sign(e.to_string()))
    }
}

impl SshAgent for UnixSshAgent {
    fn list_keys(&self) -> Result<Vec<AgentKey>, AgentError> {
        let mut client = self.connect()?;
        let identities = client
            .list_identities()
            .map_err(|e| AgentError::Sign(e.to_string()))?;

        let keys: Vec<AgentKey> = identities
            .into_iter()
            .filter_map(|public_key| {
                let algorithm = classify(public_key.key_data())?;
                Some(AgentKey {
                    fingerprint: public_key.fingerprint(Default::default()).to_string(),
                    algorithm,
                    public_key: public_key.to_bytes().ok()?,
                })
            })
            .collect();

        if keys.is_empty() {
            return Err(AgentError::NoKeys);
        }
        tracing::debug!(count = keys.len(), "agent enumerated supported keys");
        Ok(keys)
    }

    fn sign(&self, key: &AgentKey, blob: &[u8]) -> Result<Vec<u8>, AgentError> {
        let mut client = self.connect()?;
        let public_key = ssh_key::PublicKey::from_bytes(&key.public_key)
            .map_err(|e| AgentError::Sign(e.to_string()))?;
        let signature = client
            .sign(&public_key, blob)
            .map_err(|e| AgentError::Sign(e.to_string()))?;
        tracing::debug!(
            fingerprint = %key.fingerprint,
            len = blob.len(),
            "agent signed blob"
        );
        Ok(signature.as_bytes().to_vec())
    }
}

/// Deterministic test double — signs by HMAC-SHA512 over a fixed test key
/// rather than a live agent socket, so KDF and identity tests are
/// reproducible without `ssh-agent` running.
#[cfg(any(test, feature = "test-util"))]
pub mod fake {
    use super::*;
    use hmac::{Hmac, Mac};
    use sha2::Sha512;

    type HmacSha512 = Hmac<Sha512>;

    pub struct FakeSshAgent {
        keys: Vec<AgentKey>,
    }

    impl FakeSshAgent {
        /// One deterministic Ed25519-shaped key, fingerprint derived from `seed`.
        pub fn single(seed: &str) -> Self {
            Self {
                keys: vec![AgentKey {
                    fingerprint: format!("SHA256:fake-{seed}"),
                    algorithm: KeyAlgorithm::Ed25519,
                    public_key: seed.as_bytes().to_vec(),
                }],
            }
        }

        pub fn empty() -> Self {
            Self { keys: vec![] }
        }

        pub fn with_keys(keys: Vec<AgentKey>) -> Self {
            Self { keys }
        }
    }

    impl SshAgent for FakeSshAgent {
        fn list_keys(&self) -> Result<Vec<AgentKey>, AgentError> {
            if self.keys.is_empty() {
                return Err(AgentError::NoKeys);
            }
            Ok(self.keys.clone())
        }

        fn sign(&self, key: &AgentKey, blob: &[u8]) -> Result<Vec<u8>, AgentError> {
            let mut mac = HmacSha512::new_from_slice(key.fingerprint.as_bytes())
                .expect("HMAC accepts any key length");
            mac.update(blob);
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}
