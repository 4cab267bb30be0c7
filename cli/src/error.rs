use secretstore_crypto::CryptoError;
use secretstore_service::ServiceError;
use std::process::ExitCode;

/// Spec §6.3: `0` success, `1` recoverable failure (not found, wrong
/// identity), `2` usage error. Bad input (an invalid store name) is a usage
/// error; everything else a command can fail on at runtime is recoverable.
pub fn exit_code_for(err: &ServiceError) -> ExitCode {
    match err {
        ServiceError::Crypto(CryptoError::InvalidName) => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}
