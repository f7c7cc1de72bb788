//! Opaque bearer tokens (C2).
//!
//! Share tokens (and, by the same recipe, raw refresh tokens) are minted
//! here: a CSPRNG value transmitted once, with only its SHA-256 hash ever
//! persisted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

use crate::hash::sha256_hex;

/// Number of random bytes backing a minted token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Mint a new opaque token: `(rawBase64UrlToken, tokenHash)`.
///
/// The raw token is returned to the caller exactly once (e.g. embedded in
/// an invitation link); only `tokenHash` is ever persisted.
pub fn mint_share_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = URL_SAFE_NO_PAD.encode(bytes);
    let hash = sha256_hex(raw.as_bytes());
    (raw, hash)
}

/// Hash a raw token the same way `mint_share_token` does, for lookup.
pub fn hash_token(raw: &str) -> String {
    sha256_hex(raw.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_produces_matching_hash() {
        let (raw, hash) = mint_share_token();
        assert_eq!(hash_token(&raw), hash);
    }

    #[test]
    fn test_mint_is_unpredictable() {
        let (raw1, _) = mint_share_token();
        let (raw2, _) = mint_share_token();
        assert_ne!(raw1, raw2);
    }

    #[test]
    fn test_raw_token_length_is_256_bits() {
        let (raw, _) = mint_share_token();
        let decoded = URL_SAFE_NO_PAD.decode(raw).unwrap();
        assert_eq!(decoded.len(), TOKEN_BYTES);
    }
}
