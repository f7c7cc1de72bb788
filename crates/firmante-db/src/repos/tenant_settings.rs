//! Tenant settings repository (spec §3 TenantSettings, §4.11 notification
//! credential resolution).

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbTenantSettings};

pub struct TenantSettingsRepo;

impl TenantSettingsRepo {
    pub async fn find_by_tenant<'c, E>(ex: E, tenant_id: Uuid) -> DbResult<Option<DbTenantSettings>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenantSettings>(
            r#"
            SELECT tenant_id, app_name, primary_color, logo_url, zapi_instance_id, zapi_token,
                   zapi_client_token, zapi_active, resend_api_key, resend_active, final_email_template
            FROM tenant_settings WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Insert-or-update the full settings row. Used both by first-touch
    /// defaulting (row created with tenant defaults on registration) and
    /// by explicit branding/channel-credential updates.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert<'c, E>(
        ex: E,
        tenant_id: Uuid,
        app_name: &str,
        primary_color: &str,
        logo_url: Option<&str>,
        zapi_instance_id: Option<&str>,
        zapi_token: Option<&str>,
        zapi_client_token: Option<&str>,
        zapi_active: bool,
        resend_api_key: Option<&str>,
        resend_active: bool,
        final_email_template: Option<&str>,
    ) -> DbResult<DbTenantSettings>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbTenantSettings>(
            r#"
            INSERT INTO tenant_settings
                (tenant_id, app_name, primary_color, logo_url, zapi_instance_id, zapi_token,
                 zapi_client_token, zapi_active, resend_api_key, resend_active, final_email_template)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (tenant_id) DO UPDATE SET
                app_name = EXCLUDED.app_name,
                primary_color = EXCLUDED.primary_color,
                logo_url = EXCLUDED.logo_url,
                zapi_instance_id = EXCLUDED.zapi_instance_id,
                zapi_token = EXCLUDED.zapi_token,
                zapi_client_token = EXCLUDED.zapi_client_token,
                zapi_active = EXCLUDED.zapi_active,
                resend_api_key = EXCLUDED.resend_api_key,
                resend_active = EXCLUDED.resend_active,
                final_email_template = EXCLUDED.final_email_template
            RETURNING tenant_id, app_name, primary_color, logo_url, zapi_instance_id, zapi_token,
                      zapi_client_token, zapi_active, resend_api_key, resend_active, final_email_template
            "#,
        )
        .bind(tenant_id)
        .bind(app_name)
        .bind(primary_color)
        .bind(logo_url)
        .bind(zapi_instance_id)
        .bind(zapi_token)
        .bind(zapi_client_token)
        .bind(zapi_active)
        .bind(resend_api_key)
        .bind(resend_active)
        .bind(final_email_template)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }
}
