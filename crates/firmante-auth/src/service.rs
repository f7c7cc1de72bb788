//! Identity & Session (spec §4.3, C3): register, login, refresh rotation,
//! logout, switch tenant, password reset.
//!
//! Each multi-step operation threads an explicit transaction handle rather
//! than holding a `Database` clone per sub-service, so intermediate writes
//! never commit independently of the final step.

use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use firmante_audit::AuditRepo;
use firmante_crypto::{password_hash, password_verify, hash_token, mint_otp6};
use firmante_db::{Database, OtpCodeRepo, PlanRepo, SessionRepo, TenantMemberRepo, TenantRepo, UserRepo};
use firmante_types::{status, FirmanteError, Result as FirmanteResult};

use crate::jwt::JwtService;
use crate::types::TokenPair;

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub cpf: Option<String>,
    pub phone_e164: Option<String>,
}

pub struct RegisterOutput {
    pub tokens: TokenPair,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}

pub struct LoginOutput {
    pub tokens: TokenPair,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: String,
}

pub struct IdentityService<'a> {
    db: &'a Database,
    jwt: &'a JwtService,
}

impl<'a> IdentityService<'a> {
    pub fn new(db: &'a Database, jwt: &'a JwtService) -> Self {
        Self { db, jwt }
    }

    /// **Register** (spec §4.3): synthesize a personal Tenant on the free
    /// plan, an ADMIN User, and an ACTIVE TenantMember row, atomically.
    pub async fn register(&self, input: RegisterInput) -> FirmanteResult<RegisterOutput> {
        if input.password.len() < 6 {
            return Err(FirmanteError::validation("password must be at least 6 characters"));
        }

        let mut tx = self.db.begin().await?;

        if (UserRepo::find_by_email(&mut *tx, &input.email).await?).is_some() {
            return Err(FirmanteError::conflict("email already in use"));
        }
        if let Some(cpf) = &input.cpf {
            if (UserRepo::find_by_cpf(&mut *tx, cpf).await?).is_some() {
                return Err(FirmanteError::conflict("cpf already in use"));
            }
        }

        let plan = PlanRepo::find_by_slug(&mut *tx, "gratuito").await?;
        let base_slug = slugify(&input.name);
        let tenant = create_tenant_with_slug(&mut tx, &input.name, &base_slug, plan.id).await?;

        let password = password_hash(&input.password).map_err(|e| FirmanteError::internal(e.to_string()))?;
        let user = UserRepo::create(
            &mut *tx,
            tenant.id,
            &input.name,
            &input.email,
            input.cpf.as_deref(),
            input.phone_e164.as_deref(),
            &password,
            status::ROLE_ADMIN,
        )
        .await?;

        let member = TenantMemberRepo::upsert_invite(&mut *tx, tenant.id, &input.email, status::ROLE_ADMIN, Some(user.id)).await?;
        TenantMemberRepo::respond(&mut *tx, member.id, user.id, true).await?;

        AuditRepo::append(
            &mut *tx,
            tenant.id,
            status::ACTOR_USER,
            Some(user.id),
            status::ENTITY_USER,
            user.id,
            "USER_CREATED",
            None,
            None,
            serde_json::json!({ "email": user.email }),
        )
        .await?;

        let tokens = self.jwt.mint_pair(user.id, tenant.id, status::ROLE_ADMIN)?;
        let refresh_hash = hash_token(&tokens.refresh_token);
        SessionRepo::create(&mut *tx, user.id, tenant.id, &refresh_hash, tokens.refresh_expires_at).await?;

        tx.commit().await.map_err(|e| FirmanteError::internal(e.to_string()))?;

        Ok(RegisterOutput { tokens, user_id: user.id, tenant_id: tenant.id })
    }

    /// **Login** (spec §4.3). Invalid email and wrong password are
    /// deliberately indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> FirmanteResult<LoginOutput> {
        let mut tx = self.db.begin().await?;

        let user = UserRepo::find_by_email(&mut *tx, email)
            .await?
            .ok_or(FirmanteError::InvalidCredentials)?;

        if !password_verify(password, &user.password_hash) {
            return Err(FirmanteError::InvalidCredentials);
        }
        if user.status != status::USER_ACTIVE {
            return Err(FirmanteError::forbidden("account is not active"));
        }

        let role = if user.role == status::ROLE_SUPER_ADMIN { status::ROLE_SUPER_ADMIN } else { status::ROLE_ADMIN };
        let tokens = self.jwt.mint_pair(user.id, user.tenant_id, role)?;
        let refresh_hash = hash_token(&tokens.refresh_token);
        SessionRepo::create(&mut *tx, user.id, user.tenant_id, &refresh_hash, tokens.refresh_expires_at).await?;

        AuditRepo::append(
            &mut *tx,
            user.tenant_id,
            status::ACTOR_USER,
            Some(user.id),
            status::ENTITY_USER,
            user.id,
            "LOGIN_SUCCESS",
            None,
            None,
            serde_json::json!({}),
        )
        .await?;

        tx.commit().await.map_err(|e| FirmanteError::internal(e.to_string()))?;

        Ok(LoginOutput { tokens, user_id: user.id, tenant_id: user.tenant_id, role: role.to_string() })
    }

    /// **Refresh** (spec §4.3): rotation is mandatory — the matched Session
    /// row is deleted and a fresh pair minted, preserving the tenantId
    /// carried in the *old* refresh credential (not the user's personal
    /// tenant), with role re-resolved the same way login resolves it.
    pub async fn refresh(&self, raw_refresh_token: &str) -> FirmanteResult<TokenPair> {
        let claims = self.jwt.verify_refresh(raw_refresh_token)?;

        let mut tx = self.db.begin().await?;

        let sessions = SessionRepo::find_by_user(&mut *tx, claims.sub).await?;
        let presented_hash = hash_token(raw_refresh_token);
        let matched = sessions
            .into_iter()
            .find(|s| s.refresh_token_hash == presented_hash)
            .ok_or_else(|| FirmanteError::Unauthenticated("session invalid".to_string()))?;

        SessionRepo::delete(&mut *tx, matched.id).await?;

        let user = UserRepo::find_by_id(&mut *tx, claims.sub).await?;
        let role = resolve_role_for_tenant(&mut tx, &user, claims.tenant_id).await?;

        let tokens = self.jwt.mint_pair(user.id, claims.tenant_id, &role)?;
        let refresh_hash = hash_token(&tokens.refresh_token);
        SessionRepo::create(&mut *tx, user.id, claims.tenant_id, &refresh_hash, tokens.refresh_expires_at).await?;

        tx.commit().await.map_err(|e| FirmanteError::internal(e.to_string()))?;
        Ok(tokens)
    }

    /// **Logout** (spec §4.3): idempotent if the session is already gone.
    pub async fn logout(&self, user_id: Uuid, raw_refresh_token: &str) -> FirmanteResult<()> {
        let sessions = SessionRepo::find_by_user(&self.db.pg, user_id).await?;
        let presented_hash = hash_token(raw_refresh_token);
        if let Some(matched) = sessions.into_iter().find(|s| s.refresh_token_hash == presented_hash) {
            SessionRepo::delete(&self.db.pg, matched.id).await?;
        }
        Ok(())
    }

    /// **Switch tenant** (spec §4.3): additive — the prior refresh credential
    /// stays valid, a new Session is created alongside it rather than
    /// rotating the old one out.
    pub async fn switch_tenant(&self, user_id: Uuid, target_tenant_id: Uuid) -> FirmanteResult<TokenPair> {
        let mut tx = self.db.begin().await?;
        let user = UserRepo::find_by_id(&mut *tx, user_id).await?;
        let role = resolve_role_for_tenant(&mut tx, &user, target_tenant_id).await?;

        let tokens = self.jwt.mint_pair(user.id, target_tenant_id, &role)?;
        let refresh_hash = hash_token(&tokens.refresh_token);
        SessionRepo::create(&mut *tx, user.id, target_tenant_id, &refresh_hash, tokens.refresh_expires_at).await?;
        tx.commit().await.map_err(|e| FirmanteError::internal(e.to_string()))?;
        Ok(tokens)
    }

    /// `requestPasswordReset` (spec §4.3): silently no-ops on unknown users
    /// to avoid account enumeration.
    pub async fn request_password_reset(&self, email: &str, channel: &str) -> FirmanteResult<()> {
        let Some(user) = UserRepo::find_by_email(&self.db.pg, email).await? else {
            return Ok(());
        };
        let recipient = if channel == status::CHANNEL_WHATSAPP {
            user.phone_e164.clone().ok_or_else(|| FirmanteError::validation("user has no phone on file"))?
        } else {
            user.email.clone()
        };

        let otp = mint_otp6();
        let code_hash = password_hash(&otp).map_err(|e| FirmanteError::internal(e.to_string()))?;
        let expires_at = Utc::now() + Duration::minutes(15);
        OtpCodeRepo::create(&self.db.pg, &recipient, channel, &code_hash, expires_at, status::CTX_PASSWORD_RESET).await?;
        Ok(())
    }

    /// `resetPassword` (spec §4.3): matches the most recent
    /// PASSWORD_RESET OTP for either the user's email or phone.
    pub async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> FirmanteResult<()> {
        if new_password.len() < 6 {
            return Err(FirmanteError::validation("password must be at least 6 characters"));
        }

        let mut tx = self.db.begin().await?;
        let user = UserRepo::find_by_email(&mut *tx, email)
            .await?
            .ok_or(FirmanteError::InvalidCredentials)?;

        let candidates = [Some(user.email.clone()), user.phone_e164.clone()];
        let mut found = None;
        for recipient in candidates.into_iter().flatten() {
            if let Some(code) = OtpCodeRepo::find_latest_by_recipient_and_context(&mut *tx, &recipient, status::CTX_PASSWORD_RESET).await? {
                found = Some(code);
                break;
            }
        }
        let code = found.ok_or(FirmanteError::InvalidCredentials)?;

        if code.expires_at < Utc::now() {
            return Err(FirmanteError::Expired("reset code expired".to_string()));
        }
        if !password_verify(otp, &code.code_hash) {
            return Err(FirmanteError::InvalidCredentials);
        }

        let new_hash = password_hash(new_password).map_err(|e| FirmanteError::internal(e.to_string()))?;
        UserRepo::update_password(&mut *tx, user.id, &new_hash).await?;
        OtpCodeRepo::delete(&mut *tx, code.id).await?;

        tx.commit().await.map_err(|e| FirmanteError::internal(e.to_string()))?;
        Ok(())
    }
}

/// `{a, b, c} → a == user.tenantId ? (super-admin check) : active membership
/// lookup` — the role-resolution half of Refresh/Switch-tenant (spec §4.3/4.5).
async fn resolve_role_for_tenant(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user: &firmante_db::DbUser,
    tenant_id: Uuid,
) -> FirmanteResult<String> {
    if tenant_id == user.tenant_id {
        return Ok(if user.role == status::ROLE_SUPER_ADMIN { status::ROLE_SUPER_ADMIN.to_string() } else { status::ROLE_ADMIN.to_string() });
    }
    let membership = TenantMemberRepo::find_active_membership(&mut **tx, user.id, tenant_id)
        .await?
        .ok_or_else(|| FirmanteError::forbidden("not a member of that tenant"))?;
    Ok(membership.role)
}

/// Slug-from-name with a random 4-char suffix on collision (spec §4.3/§9).
pub(crate) async fn create_tenant_with_slug(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    display_name: &str,
    base_slug: &str,
    plan_id: Uuid,
) -> FirmanteResult<firmante_db::DbTenant> {
    match TenantRepo::create(&mut **tx, display_name, base_slug, plan_id).await {
        Ok(t) => Ok(t),
        Err(firmante_db::DbError::Duplicate(_)) => {
            let slug = format!("{}-{}", base_slug, random_suffix());
            TenantRepo::create(&mut **tx, display_name, &slug, plan_id).await.map_err(Into::into)
        }
        Err(e) => Err(e.into()),
    }
}

fn random_suffix() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..4).map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char).collect()
}

pub(crate) fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut last_was_dash = false;
    for c in lower.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_non_alphanumerics() {
        assert_eq!(slugify("Maria & Sons, LLC"), "maria-sons-llc");
        assert_eq!(slugify("  Café do João  "), "caf-do-jo-o");
    }

    #[test]
    fn test_random_suffix_is_four_chars() {
        assert_eq!(random_suffix().len(), 4);
    }
}
