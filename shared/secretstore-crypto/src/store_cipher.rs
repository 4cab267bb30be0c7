//! Store payload cipher: raw ChaCha20 keystream XOR, unauthenticated.
//!
//! Authentication for store contents comes from the outer HPKE-wrapped
//! guardian, not from this cipher — see the on-disk format notes in the
//! data model. Uses the RFC 7539 "legacy" 64-bit nonce variant (I4).

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20Legacy;

/// XORs `plaintext` with the ChaCha20 keystream for `(key, nonce)`. The same
/// function serves decryption — the cipher is its own inverse.
pub fn apply_keystream(key: &[u8; 32], nonce: &[u8; 8], data: &mut [u8]) {
    let mut cipher = ChaCha20Legacy::new(key.into(), nonce.into());
    cipher.apply_keystream(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_decrypt_recovers_plaintext() {
        let key = [3u8; 32];
        let nonce = [1u8; 8];
        let plaintext = b"{\"user\":\"alice\"}".to_vec();

        let mut buf = plaintext.clone();
        apply_keystream(&key, &nonce, &mut buf);
        assert_ne!(buf, plaintext);

        apply_keystream(&key, &nonce, &mut buf);
        assert_eq!(buf, plaintext);
    }

    #[test]
    fn different_nonces_give_different_ciphertext() {
        let key = [3u8; 32];
        let plaintext = b"same plaintext, same key".to_vec();

        let mut a = plaintext.clone();
        apply_keystream(&key, &[1u8; 8], &mut a);

        let mut b = plaintext.clone();
        apply_keystream(&key, &[2u8; 8], &mut b);

        assert_ne!(a, b);
    }
}
