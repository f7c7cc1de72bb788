//! Tenant repository (spec §3 Tenant, §4.3/§4.4 creation recipes).

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbTenant};

pub struct TenantRepo;

impl TenantRepo {
    /// Insert a tenant. Callers implement the "slug-from-name plus random
    /// suffix on collision" recipe (spec §4.3/§9 "Slug generation race");
    /// this method surfaces the unique-slug violation as `DbError::Duplicate`
    /// so the caller can retry with a fresh suffix.
    pub async fn create<'c, E>(
        ex: E,
        display_name: &str,
        slug: &str,
        plan_id: Uuid,
    ) -> DbResult<DbTenant>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenant>(
            r#"
            INSERT INTO tenants (display_name, slug, status, plan_id)
            VALUES ($1, $2, 'ACTIVE', $3)
            RETURNING id, display_name, slug, status, plan_id, asaas_customer_id,
                      asaas_subscription_id, subscription_status, created_at, updated_at
            "#,
        )
        .bind(display_name)
        .bind(slug)
        .bind(plan_id)
        .fetch_one(ex)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("tenants_slug_key") {
                    return DbError::Duplicate(format!("slug '{}' already exists", slug));
                }
            }
            DbError::Query(e)
        })
    }

    pub async fn find_by_id<'c, E>(ex: E, id: Uuid) -> DbResult<DbTenant>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenant>(
            r#"
            SELECT id, display_name, slug, status, plan_id, asaas_customer_id,
                   asaas_subscription_id, subscription_status, created_at, updated_at
            FROM tenants WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("tenant {}", id)))
    }

    pub async fn slug_exists<'c, E>(ex: E, slug: &str) -> DbResult<bool>
    where
        E: PgExecutor<'c>,
    {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(ex)
            .await?;
        Ok(row.is_some())
    }

    pub async fn set_subscription_status<'c, E>(
        ex: E,
        tenant_id: Uuid,
        status: Option<&str>,
    ) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("UPDATE tenants SET subscription_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(tenant_id)
            .bind(status)
            .execute(ex)
            .await?;
        Ok(())
    }
}
