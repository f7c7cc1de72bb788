//! Tenant & Membership DTOs (spec §6, C4).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use firmante_auth::membership::TenantSummary;
use firmante_db::DbTenantMember;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummaryResponse {
    pub tenant_id: Uuid,
    pub name: String,
    pub role: String,
    pub is_personal: bool,
}

impl From<TenantSummary> for TenantSummaryResponse {
    fn from(t: TenantSummary) -> Self {
        Self { tenant_id: t.tenant_id, name: t.name, role: t.role, is_personal: t.is_personal }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantUsageResponse {
    pub tenant_id: Uuid,
    pub name: String,
    pub plan_slug: String,
    pub subscription_status: Option<String>,
    pub user_count: i64,
    pub user_limit: i32,
    pub document_count: i64,
    pub document_limit: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantMemberResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub role: String,
    pub status: String,
}

impl From<DbTenantMember> for TenantMemberResponse {
    fn from(m: DbTenantMember) -> Self {
        Self { id: m.id, tenant_id: m.tenant_id, user_id: m.user_id, email: m.email, role: m.role, status: m.status }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondInviteRequest {
    pub accept: bool,
}
