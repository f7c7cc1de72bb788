//! Domain error taxonomy for Firmante (spec §7).
//!
//! These are categories, not a one-variant-per-situation enum: every
//! operation across the core raises one of these, carrying just enough
//! context to render a useful message. HTTP status mapping lives in
//! `firmante-api::error` (this crate has no axum dependency).

use thiserror::Error;

/// Result type for Firmante core operations
pub type Result<T> = std::result::Result<T, FirmanteError>;

/// Firmante error categories
#[derive(Debug, Clone, Error)]
pub enum FirmanteError {
    /// Entity does not exist, or exists but belongs to a different tenant.
    /// The two cases are deliberately indistinguishable to the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing, invalid, or expired access credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Role insufficient, subscription irregular, or plan limit reached.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing required field, malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Uniqueness violation (email, cpf, slug, tenant member).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Login or OTP verification failed; deliberately undifferentiated
    /// from "no such account" to avoid enumeration.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Share token or OTP past its `expiresAt`.
    #[error("expired: {0}")]
    Expired(String),

    /// Share token resolves to a signer/document that is no longer
    /// accepting signatures (signed, declined, cancelled, expired).
    #[error("link closed: {0}")]
    LinkClosed(String),

    /// Anything else — persistence failures, I/O errors, bugs.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FirmanteError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(why: impl Into<String>) -> Self {
        Self::Forbidden(why.into())
    }

    pub fn validation(why: impl Into<String>) -> Self {
        Self::Validation(why.into())
    }

    pub fn conflict(why: impl Into<String>) -> Self {
        Self::Conflict(why.into())
    }

    pub fn internal(why: impl Into<String>) -> Self {
        Self::Internal(why.into())
    }

    /// Stable machine-readable code, mirrored in API error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Expired(_) => "EXPIRED",
            Self::LinkClosed(_) => "LINK_CLOSED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FirmanteError::not_found("document").error_code(), "NOT_FOUND");
        assert_eq!(FirmanteError::InvalidCredentials.error_code(), "INVALID_CREDENTIALS");
    }
}
