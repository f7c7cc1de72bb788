//! Quota & Subscription Gate (spec §4.6, C6).
//!
//! Invoked as a read-only precheck before the mutating transaction that
//! the gated operation (invite member, document upload) opens — so these
//! take a plain `&PgPool` rather than a transaction handle.

use sqlx::PgPool;
use uuid::Uuid;

use firmante_db::{DbPlan, DocumentRepo, TenantMemberRepo, UserRepo};
use firmante_types::FirmanteError;

/// Paid plans only: `subscriptionStatus ∈ {OVERDUE, CANCELED}` blocks.
/// Super-admins are *not* exempt from the limit checks below, only this one.
pub fn check_subscription(plan: &DbPlan, subscription_status: Option<&str>) -> Result<(), FirmanteError> {
    use rust_decimal::Decimal;
    if plan.price > Decimal::ZERO {
        if let Some(status) = subscription_status {
            if status == firmante_types::status::SUB_OVERDUE || status == firmante_types::status::SUB_CANCELED {
                return Err(FirmanteError::forbidden("subscription is irregular"));
            }
        }
    }
    Ok(())
}

/// Occupancy (spec §4.4) = ACTIVE users owned by the tenant + non-DECLINED
/// TenantMember rows. Must be strictly less than `plan.userLimit`.
pub async fn check_user_limit(pool: &PgPool, tenant_id: Uuid, plan: &DbPlan) -> Result<(), FirmanteError> {
    let active_users = UserRepo::count_active_by_tenant(pool, tenant_id).await?;
    let members = TenantMemberRepo::count_non_declined_by_tenant(pool, tenant_id).await?;
    if active_users + members >= plan.user_limit as i64 {
        return Err(FirmanteError::forbidden("plan user limit reached"));
    }
    Ok(())
}

pub async fn check_document_limit(pool: &PgPool, tenant_id: Uuid, plan: &DbPlan) -> Result<(), FirmanteError> {
    let count = DocumentRepo::count_by_tenant(pool, tenant_id).await?;
    if count >= plan.document_limit as i64 {
        return Err(FirmanteError::forbidden("plan document limit reached"));
    }
    Ok(())
}
