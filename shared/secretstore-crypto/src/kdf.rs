//! KDF kit (C2): derives a wrap key and IV from an SSH-agent signature.
//!
//! The derivation is part of the on-disk format. Changing the iteration
//! count, hash, or output length makes every existing identity unrecoverable.

use crate::agent::{AgentKey, SshAgent};
use crate::error::Result;
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use zeroize::Zeroizing;

const ITERATIONS: u32 = 390_000;
const OKM_LEN: usize = 48;

/// A derived (wrap_key, iv) pair. `iv` is carried for format compatibility
/// only — nothing in this crate performs AES-CBC with it directly; the
/// PKCS#8 encryption machinery chooses its own IV internally.
pub struct EncryptionPack {
    pub wrap_key: Zeroizing<[u8; 32]>,
    pub iv: Zeroizing<[u8; 16]>,
}

impl EncryptionPack {
    /// Draws a fresh 16-byte seed and derives a pack from it, returning both.
    pub fn new(agent: &dyn SshAgent, key: &AgentKey) -> Result<(Self, [u8; 16])> {
        let mut seed = [0u8; 16];
        OsRng.fill_bytes(&mut seed);
        let pack = Self::from_seed(agent, key, &seed)?;
        Ok((pack, seed))
    }

    /// Reproduces a pack from an existing 16-byte seed.
    pub fn from_seed(agent: &dyn SshAgent, key: &AgentKey, seed: &[u8; 16]) -> Result<Self> {
        let signature = agent.sign(key, seed)?;

        let mut okm = [0u8; OKM_LEN];
        pbkdf2_hmac::<Sha512>(&signature, seed, ITERATIONS, &mut okm);

        let mut wrap_key = [0u8; 32];
        let mut iv = [0u8; 16];
        wrap_key.copy_from_slice(&okm[0..32]);
        iv.copy_from_slice(&okm[32..48]);

        Ok(Self {
            wrap_key: Zeroizing::new(wrap_key),
            iv: Zeroizing::new(iv),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fake::FakeSshAgent;

    #[test]
    fn same_seed_same_agent_key_is_deterministic() {
        let agent = FakeSshAgent::single("alice");
        let key = agent.list_keys().unwrap().remove(0);
        let seed = [7u8; 16];

        let first = EncryptionPack::from_seed(&agent, &key, &seed).unwrap();
        let second = EncryptionPack::from_seed(&agent, &key, &seed).unwrap();

        assert_eq!(*first.wrap_key, *second.wrap_key);
        assert_eq!(*first.iv, *second.iv);
    }

    #[test]
    fn different_seeds_yield_different_wrap_keys() {
        let agent = FakeSshAgent::single("alice");
        let key = agent.list_keys().unwrap().remove(0);

        let a = EncryptionPack::from_seed(&agent, &key, &[1u8; 16]).unwrap();
        let b = EncryptionPack::from_seed(&agent, &key, &[2u8; 16]).unwrap();

        assert_ne!(*a.wrap_key, *b.wrap_key);
    }

    #[test]
    fn new_draws_a_fresh_seed_each_time() {
        let agent = FakeSshAgent::single("alice");
        let key = agent.list_keys().unwrap().remove(0);

        let (_, seed_a) = EncryptionPack::new(&agent, &key).unwrap();
        let (_, seed_b) = EncryptionPack::new(&agent, &key).unwrap();

        assert_ne!(seed_a, seed_b);
    }
}
