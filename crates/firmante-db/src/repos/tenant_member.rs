//! Tenant membership repository (spec §3 TenantMember, §4.4 invite lifecycle).

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbTenantMember};

pub struct TenantMemberRepo;

impl TenantMemberRepo {
    /// Upsert on the `(tenant_id, email)` unique key — re-inviting a
    /// previously-declined address resets it back to PENDING.
    pub async fn upsert_invite<'c, E>(
        ex: E,
        tenant_id: Uuid,
        email: &str,
        role: &str,
        user_id: Option<Uuid>,
    ) -> DbResult<DbTenantMember>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenantMember>(
            r#"
            INSERT INTO tenant_members (tenant_id, user_id, email, role, status, invited_at)
            VALUES ($1, $2, $3, $4, 'PENDING', NOW())
            ON CONFLICT (tenant_id, email)
            DO UPDATE SET user_id = EXCLUDED.user_id, role = EXCLUDED.role,
                          status = 'PENDING', invited_at = NOW()
            RETURNING id, tenant_id, user_id, email, role, status, invited_at
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(email)
        .bind(role)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_tenant_and_email<'c, E>(
        ex: E,
        tenant_id: Uuid,
        email: &str,
    ) -> DbResult<Option<DbTenantMember>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenantMember>(
            "SELECT id, tenant_id, user_id, email, role, status, invited_at
             FROM tenant_members WHERE tenant_id = $1 AND email = $2",
        )
        .bind(tenant_id)
        .bind(email)
        .fetch_optional(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_active_membership<'c, E>(
        ex: E,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> DbResult<Option<DbTenantMember>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenantMember>(
            "SELECT id, tenant_id, user_id, email, role, status, invited_at
             FROM tenant_members WHERE user_id = $1 AND tenant_id = $2 AND status = 'ACTIVE'",
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Every ACTIVE membership for a user, joined with the tenant's
    /// display name — feeds "list my tenants" (spec §4.4).
    pub async fn list_active_by_user<'c, E>(
        ex: E,
        user_id: Uuid,
    ) -> DbResult<Vec<(DbTenantMember, String)>>
    where
        E: PgExecutor<'c>,
    {
        let rows: Vec<(Uuid, Uuid, Option<Uuid>, String, String, String, chrono::DateTime<chrono::Utc>, String)> =
            sqlx::query_as(
                r#"
                SELECT tm.id, tm.tenant_id, tm.user_id, tm.email, tm.role, tm.status, tm.invited_at,
                       t.display_name
                FROM tenant_members tm
                JOIN tenants t ON t.id = tm.tenant_id
                WHERE tm.user_id = $1 AND tm.status = 'ACTIVE'
                "#,
            )
            .bind(user_id)
            .fetch_all(ex)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, tenant_id, user_id, email, role, status, invited_at, display_name)| {
                (
                    DbTenantMember { id, tenant_id, user_id, email, role, status, invited_at },
                    display_name,
                )
            })
            .collect())
    }

    /// PENDING invites matching either `user_id` or `email` (spec §4.4
    /// "List/respond invites" — a user may be invited before they
    /// registered, so the row may still carry no `user_id`).
    pub async fn list_pending_by_user_or_email<'c, E>(
        ex: E,
        user_id: Uuid,
        email: &str,
    ) -> DbResult<Vec<DbTenantMember>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenantMember>(
            r#"
            SELECT id, tenant_id, user_id, email, role, status, invited_at
            FROM tenant_members
            WHERE status = 'PENDING' AND (user_id = $1 OR email = $2)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_id<'c, E>(ex: E, id: Uuid) -> DbResult<DbTenantMember>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenantMember>(
            "SELECT id, tenant_id, user_id, email, role, status, invited_at
             FROM tenant_members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("tenant member {}", id)))
    }

    /// Accept or decline an invite, populating `user_id` on first match by
    /// email if the row predates the invitee's registration.
    pub async fn respond<'c, E>(ex: E, id: Uuid, user_id: Uuid, accept: bool) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        let status = if accept { "ACTIVE" } else { "DECLINED" };
        sqlx::query(
            "UPDATE tenant_members SET status = $2, user_id = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(user_id)
        .execute(ex)
        .await?;
        Ok(())
    }

    /// Occupancy half of spec §4.4/§4.6's quota formula: memberships that
    /// still count against the plan's user limit.
    pub async fn count_non_declined_by_tenant<'c, E>(ex: E, tenant_id: Uuid) -> DbResult<i64>
    where
        E: PgExecutor<'c>,
    {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tenant_members WHERE tenant_id = $1 AND status != 'DECLINED'",
        )
        .bind(tenant_id)
        .fetch_one(ex)
        .await?;
        Ok(count)
    }
}
