use thiserror::Error;

/// Failures surfaced by the SSH agent adapter (C1).
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("no SSH agent is reachable (is SSH_AUTH_SOCK set?)")]
    NoAgent,
    #[error("agent holds no Ed25519 or RSA key")]
    NoKeys,
    #[error("agent signing request failed: {0}")]
    Sign(String),
}

/// Failures from the crypto primitives (C2, C6, C9).
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("key derivation failed: {0}")]
    Kdf(String),
    #[error("HPKE operation failed: {0}")]
    Hpke(String),
    #[error("PKCS#8 encoding/decryption failed: {0}")]
    Pkcs8(String),
    #[error("store name does not match the required pattern")]
    InvalidName,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
