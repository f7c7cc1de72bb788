//! Token and principal shapes (spec §3 Session, §4.3/§4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The request principal produced by `authenticate` (spec §4.5).
///
/// `tenant_id` and `role` come from the *credential*, not a fresh read of
/// the `User` row — that is what lets tenant switching take effect
/// immediately, without a stale DB read overriding the active tenant.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub tenant_id: Uuid,
    pub role: String,
}

impl Principal {
    pub fn is_super_admin(&self) -> bool {
        self.role == firmante_types::status::ROLE_SUPER_ADMIN
    }

    /// `roleGuard(allowed)` (spec §4.5): super-admin always passes.
    pub fn has_role(&self, allowed: &[&str]) -> bool {
        self.is_super_admin() || allowed.contains(&self.role.as_str())
    }
}

/// Claims embedded in the access credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub tenant_id: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Claims embedded in the refresh credential. Deliberately carries no
/// `role` — role is re-resolved at refresh time (spec §4.3) so a role
/// change takes effect on the next refresh rather than living in a
/// long-lived token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub tenant_id: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}
