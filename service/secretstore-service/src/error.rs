use thiserror::Error;

/// Stable error taxonomy for the service layer (§7). The CLI maps these to
/// exit codes and human prose; nothing here is retried.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Crypto(#[from] secretstore_crypto::CryptoError),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("no {kind} found for key {key:?}")]
    NotFound { kind: &'static str, key: String },

    #[error("no identity available to unseal store {0:?}")]
    NoIdentityForStoreFound(String),

    #[error("a {kind} with key {key:?} already exists")]
    Duplicate { kind: &'static str, key: String },

    #[error("a store named {0:?} already exists")]
    NameAlreadyUsed(String),

    #[error("cryptographic operation failed irrecoverably: {0}")]
    CryptoFailure(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
