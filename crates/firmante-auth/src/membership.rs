//! Tenant & Membership (spec §4.4, C4).

use uuid::Uuid;

use firmante_audit::AuditRepo;
use firmante_crypto::password_hash;
use firmante_db::{Database, DbTenantMember, PlanRepo, TenantMemberRepo, TenantRepo, UserRepo};
use firmante_types::{status, FirmanteError, Result as FirmanteResult};

use crate::quota::{check_subscription, check_user_limit};
use crate::service::{create_tenant_with_slug, slugify};

pub struct TenantSummary {
    pub tenant_id: Uuid,
    pub name: String,
    pub role: String,
    pub is_personal: bool,
}

pub struct TenantMembershipService<'a> {
    db: &'a Database,
}

impl<'a> TenantMembershipService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// **Create tenant with admin** (super-admin op, spec §4.4): slug from
    /// name with random-suffix collision handling, default plan `basico`.
    pub async fn create_tenant_with_admin(
        &self,
        display_name: &str,
        owner_name: &str,
        owner_email: &str,
        owner_password: &str,
    ) -> FirmanteResult<Uuid> {
        let mut tx = self.db.begin().await?;

        if (UserRepo::find_by_email(&mut *tx, owner_email).await?).is_some() {
            return Err(FirmanteError::conflict("email already in use"));
        }

        let plan = PlanRepo::find_by_slug(&mut *tx, "basico").await?;
        let base_slug = slugify(display_name);
        let tenant = create_tenant_with_slug(&mut tx, display_name, &base_slug, plan.id).await?;

        let password = password_hash(owner_password).map_err(|e| FirmanteError::internal(e.to_string()))?;
        let owner = UserRepo::create(&mut *tx, tenant.id, owner_name, owner_email, None, None, &password, status::ROLE_ADMIN).await?;

        let member = TenantMemberRepo::upsert_invite(&mut *tx, tenant.id, owner_email, status::ROLE_ADMIN, Some(owner.id)).await?;
        TenantMemberRepo::respond(&mut *tx, member.id, owner.id, true).await?;

        tx.commit().await.map_err(|e| FirmanteError::internal(e.to_string()))?;
        Ok(tenant.id)
    }

    /// **List my tenants** (spec §4.4): the user's own personal tenant plus
    /// every ACTIVE membership elsewhere.
    pub async fn list_my_tenants(&self, user_id: Uuid) -> FirmanteResult<Vec<TenantSummary>> {
        let user = UserRepo::find_by_id(&self.db.pg, user_id).await?;
        let personal_tenant = TenantRepo::find_by_id(&self.db.pg, user.tenant_id).await?;

        let mut out = vec![TenantSummary {
            tenant_id: personal_tenant.id,
            name: personal_tenant.display_name,
            role: status::ROLE_ADMIN.to_string(),
            is_personal: true,
        }];

        for (member, tenant_name) in TenantMemberRepo::list_active_by_user(&self.db.pg, user_id).await? {
            out.push(TenantSummary {
                tenant_id: member.tenant_id,
                name: tenant_name,
                role: member.role,
                is_personal: false,
            });
        }
        Ok(out)
    }

    /// **Invite member** (spec §4.4): gated by the quota/subscription check
    /// (C6), requires the invitee to already be a registered User.
    pub async fn invite_member(&self, current_tenant_id: Uuid, email: &str, role: &str) -> FirmanteResult<DbTenantMember> {
        let tenant = TenantRepo::find_by_id(&self.db.pg, current_tenant_id).await?;
        let plan = PlanRepo::find_by_id(&self.db.pg, tenant.plan_id).await?;

        check_subscription(&plan, tenant.subscription_status.as_deref())?;
        check_user_limit(&self.db.pg, current_tenant_id, &plan).await?;

        let target_user = UserRepo::find_by_email(&self.db.pg, email)
            .await?
            .ok_or_else(|| FirmanteError::not_found("no registered user with that email"))?;

        if let Some(existing) = TenantMemberRepo::find_by_tenant_and_email(&self.db.pg, current_tenant_id, email).await? {
            if existing.status == status::MEMBER_ACTIVE {
                return Err(FirmanteError::conflict("already an active member"));
            }
        }

        TenantMemberRepo::upsert_invite(&self.db.pg, current_tenant_id, email, role, Some(target_user.id))
            .await
            .map_err(Into::into)

        // Notification delivery to `${FRONT_URL}/onboarding` is dispatched
        // by the caller via `firmante-api`'s notification adapter (C11).
    }

    pub async fn list_pending_invites(&self, user_id: Uuid, email: &str) -> FirmanteResult<Vec<DbTenantMember>> {
        TenantMemberRepo::list_pending_by_user_or_email(&self.db.pg, user_id, email)
            .await
            .map_err(Into::into)
    }

    /// **Respond to invite** (spec §4.4): row must match by `userId`, or —
    /// if it predates the invitee's registration — by current email.
    pub async fn respond_invite(&self, user_id: Uuid, email: &str, invite_id: Uuid, accept: bool) -> FirmanteResult<()> {
        let mut tx = self.db.begin().await?;
        let invite = TenantMemberRepo::find_by_id(&mut *tx, invite_id).await?;

        let matches = invite.user_id == Some(user_id) || (invite.user_id.is_none() && invite.email == email);
        if !matches {
            return Err(FirmanteError::forbidden("invite does not belong to this user"));
        }

        let tenant_id = invite.tenant_id;
        AuditRepo::append(
            &mut *tx,
            tenant_id,
            status::ACTOR_USER,
            Some(user_id),
            status::ENTITY_USER,
            user_id,
            if accept { "INVITE_ACCEPTED" } else { "INVITE_DECLINED" },
            None,
            None,
            serde_json::json!({ "inviteId": invite_id }),
        )
        .await?;

        TenantMemberRepo::respond(&mut *tx, invite_id, user_id, accept).await?;
        tx.commit().await.map_err(|e| FirmanteError::internal(e.to_string()))?;
        Ok(())
    }
}
