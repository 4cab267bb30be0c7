//! Name policy (C9). A programmer/input-error check, not a crypto failure.

use crate::error::{CryptoError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]\w*[A-Za-z0-9]$").expect("valid regex"))
}

/// Rejects names shorter than two characters or containing anything outside
/// `[A-Za-z0-9_]`, with alphanumeric start and end.
pub fn verify_name(name: &str) -> Result<()> {
    if pattern().is_match(name) {
        Ok(())
    } else {
        Err(CryptoError::InvalidName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        assert!(verify_name("gmail").is_ok());
        assert!(verify_name("ab").is_ok());
        assert!(verify_name("my_account_1").is_ok());
    }

    #[test]
    fn rejects_too_short() {
        assert!(verify_name("a").is_err());
        assert!(verify_name("").is_err());
    }

    #[test]
    fn rejects_bad_edges_and_characters() {
        assert!(verify_name("_gmail").is_err());
        assert!(verify_name("gmail_").is_err());
        assert!(verify_name("gmail!").is_err());
        assert!(verify_name("gm ail").is_err());
    }
}
