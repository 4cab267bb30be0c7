//! Identity projections (§3). Raw row persistence lives in the service
//! crate's DAO; this is the shape callers actually work with.

use zeroize::Zeroizing;

/// `{fingerprint, public_key}` — forgeable from the private projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicIdentity {
    pub fingerprint: String,
    /// DER-encoded SubjectPublicKeyInfo.
    pub public_key_der: Vec<u8>,
    /// Raw (uncompressed SEC1) public key bytes, for the HPKE KEM.
    pub public_key_raw: Vec<u8>,
}

/// The public projection plus the decrypted private scalar.
///
/// `private_key_raw` is zeroized on drop; it never outlives one guardian
/// open/create call in the service layer.
pub struct PrivateIdentity {
    pub public: PublicIdentity,
    pub private_key_raw: Zeroizing<Vec<u8>>,
}

impl PrivateIdentity {
    pub fn fingerprint(&self) -> &str {
        &self.public.fingerprint
    }
}
