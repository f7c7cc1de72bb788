//! Authorization gates (spec §4.5, C5).
//!
//! `authenticate` is exposed as an Axum extractor so every handler that
//! needs a caller just takes `Principal` as an argument; `role_allows` is
//! the plain function `roleGuard`/`superAdminGuard` reduce to, for
//! handlers that need a stricter check than "any authenticated caller".

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use firmante_db::{Database, UserRepo};
use firmante_types::FirmanteError;

use crate::jwt::JwtService;
use crate::types::Principal;

/// `roleGuard(allowed)`: super-admin always passes regardless of `allowed`.
pub fn role_allows(role: &str, allowed: &[&str]) -> bool {
    role == firmante_types::status::ROLE_SUPER_ADMIN || allowed.contains(&role)
}

/// `superAdminGuard`.
pub fn require_super_admin(principal: &Principal) -> Result<(), FirmanteError> {
    if principal.is_super_admin() {
        Ok(())
    } else {
        Err(FirmanteError::forbidden("super-admin role required"))
    }
}

pub fn require_role(principal: &Principal, allowed: &[&str]) -> Result<(), FirmanteError> {
    if role_allows(&principal.role, allowed) {
        Ok(())
    } else {
        Err(FirmanteError::forbidden(format!(
            "role {} is not permitted; requires one of {:?}",
            principal.role, allowed
        )))
    }
}

/// Anything that can hand an extractor a `JwtService` and a `Database` —
/// implemented by `firmante-api`'s `AppState` via `axum::extract::FromRef`.
pub trait AuthState: Send + Sync {
    fn jwt(&self) -> &JwtService;
    fn db(&self) -> &Database;
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: AuthState + Send + Sync,
{
    type Rejection = (StatusCode, String);

    /// `authenticate` (spec §4.5): validate the access credential, load
    /// the User by embedded userId with status=ACTIVE, and build the
    /// principal from the *credential's* tenantId/role, not the user row.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| (StatusCode::UNAUTHORIZED, "missing bearer credential".to_string()))?;

        let claims = state
            .jwt()
            .verify_access(bearer.token())
            .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

        let user = UserRepo::find_by_id(&state.db().pg, claims.sub)
            .await
            .map_err(|_| (StatusCode::UNAUTHORIZED, "unknown user".to_string()))?;

        if user.status != firmante_types::status::USER_ACTIVE {
            return Err((StatusCode::UNAUTHORIZED, "account is not active".to_string()));
        }

        Ok(Principal {
            id: user.id,
            email: user.email,
            tenant_id: claims.tenant_id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_allows_super_admin_bypass() {
        assert!(role_allows("SUPER_ADMIN", &["MANAGER"]));
    }

    #[test]
    fn test_role_allows_member_of_list() {
        assert!(role_allows("MANAGER", &["ADMIN", "MANAGER"]));
        assert!(!role_allows("VIEWER", &["ADMIN", "MANAGER"]));
    }
}
