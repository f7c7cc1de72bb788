//! Password hashing (C2).
//!
//! Used both for user login passwords and — per spec §4.2/§4.8 — as the
//! slow, salted hash applied to OTP codes before they are persisted.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::{CryptoError, CryptoResult};

/// Hash a password (or OTP code) into an opaque, self-describing string.
pub fn password_hash(secret: &str) -> CryptoResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CryptoError::HashingFailed(e.to_string()))
}

/// Verify a password (or OTP code) against a previously produced hash.
/// Constant-time by construction (argon2's verifier does not short-circuit
/// on the first mismatched byte).
pub fn password_verify(secret: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = password_hash("StrongPw1").unwrap();
        assert!(password_verify("StrongPw1", &hash));
        assert!(!password_verify("WrongPw1", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let h1 = password_hash("same-secret").unwrap();
        let h2 = password_hash("same-secret").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!password_verify("anything", "not-a-valid-hash"));
    }
}
