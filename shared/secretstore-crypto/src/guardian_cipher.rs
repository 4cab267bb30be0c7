//! Pure HPKE primitives backing the guardian mechanism (C6).
//!
//! Cipher suite is fixed per the on-disk format: HPKE base mode,
//! KEM = DHKEM(P-256, HKDF-SHA256), KDF = HKDF-SHA256, AEAD = AES-256-GCM.

use crate::error::{CryptoError, Result};
use hpke::aead::AesGcm256;
use hpke::kdf::HkdfSha256;
use hpke::kem::{DhP256HkdfSha256, Kem as KemTrait};
use hpke::{Deserializable, OpModeR, OpModeS, Serializable};
use rand::rngs::OsRng;

type Kem = DhP256HkdfSha256;

const INFO: &[u8] = b"secret-store-guardian-v1";

/// Seals a 32-byte data key to `recipient_public_key` (DER-free raw P-256
/// public key bytes, as produced by [`KemTrait::PublicKey::to_bytes`]).
///
/// Returns `(encapsulated_key, ciphertext)`: 65 and 48 bytes respectively
/// for this cipher suite.
pub fn seal(recipient_public_key: &[u8], data_key: &[u8; 32]) -> Result<(Vec<u8>, Vec<u8>)> {
    let public_key = <Kem as KemTrait>::PublicKey::from_bytes(recipient_public_key)
        .map_err(|e| CryptoError::Hpke(e.to_string()))?;

    let mut csprng = OsRng;
    let (encapped_key, mut sender_ctx) =
        hpke::setup_sender::<AesGcm256, HkdfSha256, Kem, _>(
            &OpModeS::Base,
            &public_key,
            INFO,
            &mut csprng,
        )
        .map_err(|e| CryptoError::Hpke(e.to_string()))?;

    let ciphertext = sender_ctx
        .seal(data_key, &[])
        .map_err(|e| CryptoError::Hpke(e.to_string()))?;

    Ok((encapped_key.to_bytes().to_vec(), ciphertext))
}

/// Opens a guardian sealed by [`seal`]. Failure (tampering, wrong key) is
/// always fatal for the caller — there is no partial-success case.
pub fn open(
    recipient_private_key: &[u8],
    encapsulated_key: &[u8],
    ciphertext: &[u8],
) -> Result<[u8; 32]> {
    let private_key = <Kem as KemTrait>::PrivateKey::from_bytes(recipient_private_key)
        .map_err(|e| CryptoError::Hpke(e.to_string()))?;
    let encapped_key = <Kem as KemTrait>::EncappedKey::from_bytes(encapsulated_key)
        .map_err(|e| CryptoError::Hpke(e.to_string()))?;

    let mut receiver_ctx =
        hpke::setup_receiver::<AesGcm256, HkdfSha256, Kem>(
            &OpModeR::Base,
            &private_key,
            &encapped_key,
            INFO,
        )
        .map_err(|e| CryptoError::Hpke(e.to_string()))?;

    let plaintext = receiver_ctx
        .open(ciphertext, &[])
        .map_err(|_| CryptoError::Hpke("guardian open failed (tampering or wrong key)".into()))?;

    plaintext
        .try_into()
        .map_err(|_| CryptoError::Hpke("decrypted data key has the wrong length".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn seal_open_roundtrip() {
        let mut csprng = OsRng;
        let (sk, pk) = <Kem as KemTrait>::gen_keypair(&mut csprng);

        let mut data_key = [0u8; 32];
        OsRng.fill_bytes(&mut data_key);

        let (encapped, ciphertext) = seal(&pk.to_bytes(), &data_key).unwrap();
        assert_eq!(encapped.len(), 65);

        let opened = open(&sk.to_bytes(), &encapped, &ciphertext).unwrap();
        assert_eq!(opened, data_key);
    }

    #[test]
    fn open_fails_with_wrong_key() {
        let mut csprng = OsRng;
        let (_sk, pk) = <Kem as KemTrait>::gen_keypair(&mut csprng);
        let (wrong_sk, _wrong_pk) = <Kem as KemTrait>::gen_keypair(&mut csprng);

        let data_key = [9u8; 32];
        let (encapped, ciphertext) = seal(&pk.to_bytes(), &data_key).unwrap();

        assert!(open(&wrong_sk.to_bytes(), &encapped, &ciphertext).is_err());
    }
}
