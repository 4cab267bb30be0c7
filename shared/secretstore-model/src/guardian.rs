//! Guardian row (§3): an HPKE-sealed copy of a store's data key, addressed
//! to one identity.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guardian {
    pub store_name: String,
    pub identity_fingerprint: String,
    /// HPKE encapsulated sender key (65 bytes for P-256 DHKEM).
    pub aead_enc: Vec<u8>,
    /// HPKE AEAD ciphertext of the 32-byte data key (48 bytes).
    pub enc_key: Vec<u8>,
}
