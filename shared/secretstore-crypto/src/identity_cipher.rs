//! P-256 keypair generation and PKCS#8 at-rest encryption for identities (C4).
//!
//! The encryption scheme (PBKDF2-HMAC-SHA512 + AES-128-CBC) is part of the
//! on-disk format and must not drift from what [`crate::kdf`] derives.

use crate::error::{CryptoError, Result};
use elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey};
use p256::{PublicKey, SecretKey};
use pkcs5::pbes2;
use pkcs8::{EncryptedPrivateKeyInfo, SecretDocument};
use rand::rngs::OsRng;

const PBKDF2_ROUNDS: u32 = 390_000;
const SALT_LEN: usize = 16;
const IV_LEN: usize = 16;

/// Fresh P-256 keypair for a new identity.
pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let secret = SecretKey::random(&mut OsRng);
    let public = secret.public_key();
    (secret, public)
}

/// DER-encoded SubjectPublicKeyInfo, as persisted in `identities.public_key`.
pub fn encode_public_key(public: &PublicKey) -> Result<Vec<u8>> {
    public
        .to_public_key_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| CryptoError::Pkcs8(e.to_string()))
}

/// Encrypts `secret` into a PKCS#8 `EncryptedPrivateKeyInfo` DER blob using
/// `passphrase` (the wrap key derived by [`crate::kdf::EncryptionPack`]).
pub fn encrypt_private_key(secret: &SecretKey, passphrase: &[u8]) -> Result<Vec<u8>> {
    let plain_doc: SecretDocument = secret
        .to_pkcs8_der()
        .map_err(|e| CryptoError::Pkcs8(e.to_string()))?;

    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    use rand::RngCore;
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let params = pbes2::Parameters::pbkdf2_sha512_aes128cbc(PBKDF2_ROUNDS, &salt, &iv)
        .map_err(|e| CryptoError::Pkcs8(e.to_string()))?;

    let encrypted_doc = plain_doc
        .encrypt_with_params(params, passphrase)
        .map_err(|e| CryptoError::Pkcs8(e.to_string()))?;

    Ok(encrypted_doc.as_bytes().to_vec())
}

/// Decrypts a blob produced by [`encrypt_private_key`] back into the P-256
/// private scalar.
pub fn decrypt_private_key(encrypted_der: &[u8], passphrase: &[u8]) -> Result<SecretKey> {
    let info = EncryptedPrivateKeyInfo::try_from(encrypted_der)
        .map_err(|e| CryptoError::Pkcs8(e.to_string()))?;
    let plain_doc = info
        .decrypt(passphrase)
        .map_err(|e| CryptoError::Pkcs8(e.to_string()))?;

    SecretKey::from_pkcs8_der(plain_doc.as_bytes())
        .map_err(|e| CryptoError::Pkcs8(e.to_string()))
}

/// Raw (uncompressed SEC1) public key bytes, the form the guardian cipher
/// consumes as an HPKE KEM public key.
pub fn public_key_to_raw(public: &PublicKey) -> Vec<u8> {
    public.to_encoded_point(false).as_bytes().to_vec()
}

/// Raw 32-byte P-256 scalar, the form the guardian cipher consumes as an
/// HPKE KEM private key.
pub fn secret_key_to_raw(secret: &SecretKey) -> Vec<u8> {
    secret.to_bytes().to_vec()
}
