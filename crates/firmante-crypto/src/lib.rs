//! Firmante Crypto - cryptographic primitives for the signing backend
//!
//! This crate provides:
//! - Hashing (SHA-256) for the audit chain, document fingerprints, and certificates
//! - Password hashing (Argon2id) for user credentials and OTP codes
//! - Opaque bearer tokens (share tokens, refresh tokens)
//! - Numeric one-time codes
//!
//! # Security invariant
//!
//! Raw secrets (share tokens, refresh tokens, OTP codes) are transmitted once
//! and never persisted — only their hash is stored. See DESIGN.md.

pub mod hash;
pub mod password;
pub mod token;
pub mod otp;

pub use hash::*;
pub use password::*;
pub use token::*;
pub use otp::*;

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    #[error("password verification failed: {0}")]
    VerificationFailed(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
