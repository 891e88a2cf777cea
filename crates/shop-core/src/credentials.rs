//! # Credential Check
//!
//! The seam through which registration stores a password and login compares
//! one.
//!
//! **Warning:** the only implementation, [`PlaintextCredentials`], stores
//! and compares passwords verbatim. A production deployment must replace it
//! with a salted-hash implementation; nothing else in the shop needs to
//! change when it does.

use std::fmt;

/// Prepares credentials for storage and verifies supplied ones.
pub trait CredentialCheck: fmt::Debug + Send + Sync {
    /// Turns a raw password into the value written to `users.password`.
    fn prepare(&self, raw: &str) -> String;

    /// Checks a supplied password against the stored value.
    fn verify(&self, stored: &str, supplied: &str) -> bool;
}

/// Exact-equality comparison of plaintext passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextCredentials;

impl CredentialCheck for PlaintextCredentials {
    fn prepare(&self, raw: &str) -> String {
        raw.to_string()
    }

    fn verify(&self, stored: &str, supplied: &str) -> bool {
        stored == supplied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_round_trip() {
        let creds = PlaintextCredentials;
        let stored = creds.prepare("longenough1");

        assert!(creds.verify(&stored, "longenough1"));
        assert!(!creds.verify(&stored, "longenough2"));
        assert!(!creds.verify(&stored, "LONGENOUGH1"));
    }
}
