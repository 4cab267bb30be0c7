//! Store entities (§3): the persisted, encrypted row and the plaintext
//! view callers actually read and write.

use std::collections::BTreeMap;

/// `{name, ciphertext, nonce}` as persisted. `nonce` is always 8 bytes (I4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedStore {
    pub name: String,
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 8],
}

/// Plaintext view, never persisted as such. `data` is a `BTreeMap` rather
/// than a `HashMap` so its JSON serialization (callers serialize `data`
/// directly, not `Store` as a whole) is key-order-stable for round-trip
/// tests (§4.8, "payload canonicalization").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Store {
    pub name: String,
    pub data: BTreeMap<String, String>,
}

impl Store {
    pub fn new(name: impl Into<String>, data: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}
