//! Hashing utilities for Firmante

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 hash and return as a 64-char hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Compute hash of multiple concatenated items
pub fn hash_all(items: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(item);
    }
    hasher.finalize().into()
}

/// Compute hash of multiple concatenated items as hex
pub fn hash_all_hex(items: &[&[u8]]) -> String {
    hex::encode(hash_all(items))
}

/// First 6 uppercase hex characters of a hash — the human-shareable
/// "short code" derived from a signature hash (spec §4.2).
pub fn short_code_from_hash(hash_hex: &str) -> String {
    hash_hex.chars().take(6).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"Hello, Firmante!";
        let hash = sha256_hex(data);
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sha256_hex(b"abc"), sha256_hex(b"abc"));
        assert_ne!(sha256_hex(b"abc"), sha256_hex(b"abd"));
    }

    #[test]
    fn test_short_code() {
        let hash = sha256_hex(b"signature-bytes");
        let code = short_code_from_hash(&hash);
        assert_eq!(code.len(), 6);
        assert_eq!(code, code.to_uppercase());
    }
}
