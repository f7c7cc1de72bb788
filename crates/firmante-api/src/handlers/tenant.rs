//! Tenant & Membership handlers (spec §6, C4).

use std::sync::Arc;

use axum::{extract::State, Json};

use firmante_auth::{authz::require_role, Principal};
use firmante_db::{PlanRepo, TenantMemberRepo, TenantRepo, UserRepo};
use firmante_types::status;

use crate::dto::{
    InviteMemberRequest, RespondInviteRequest, SuccessResponse, TenantMemberResponse,
    TenantSummaryResponse, TenantUsageResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn my_tenant(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<TenantUsageResponse>, ApiError> {
    let tenant = TenantRepo::find_by_id(&state.db.pg, principal.tenant_id).await?;
    let plan = PlanRepo::find_by_id(&state.db.pg, tenant.plan_id).await?;
    let user_count = UserRepo::count_active_by_tenant(&state.db.pg, tenant.id).await?
        + TenantMemberRepo::count_non_declined_by_tenant(&state.db.pg, tenant.id).await?;
    let document_count = firmante_db::DocumentRepo::count_by_tenant(&state.db.pg, tenant.id).await?;

    Ok(Json(TenantUsageResponse {
        tenant_id: tenant.id,
        name: tenant.display_name,
        plan_slug: plan.slug,
        subscription_status: tenant.subscription_status,
        user_count,
        user_limit: plan.user_limit,
        document_count,
        document_limit: plan.document_limit,
    }))
}

pub async fn available_tenants(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<TenantSummaryResponse>>, ApiError> {
    let membership = firmante_auth::TenantMembershipService::new(&state.db);
    let tenants = membership.list_my_tenants(principal.id).await?;
    Ok(Json(tenants.into_iter().map(Into::into).collect()))
}

pub async fn invite_member(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<InviteMemberRequest>,
) -> Result<Json<TenantMemberResponse>, ApiError> {
    require_role(&principal, &[status::ROLE_ADMIN])?;

    let membership = firmante_auth::TenantMembershipService::new(&state.db);
    let member = membership.invite_member(principal.tenant_id, &req.email, &req.role).await?;

    let tenant = TenantRepo::find_by_id(&state.db.pg, principal.tenant_id).await?;
    let onboarding_link = format!("{}/onboarding", state.front_url);
    state
        .notifier
        .send_email(
            &state.db,
            principal.tenant_id,
            &req.email,
            &format!("Convite para {}", tenant.display_name),
            &format!("Você foi convidado para {}. Acesse: {}", tenant.display_name, onboarding_link),
        )
        .await;

    Ok(Json(member.into()))
}

pub async fn list_pending_invites(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<TenantMemberResponse>>, ApiError> {
    let membership = firmante_auth::TenantMembershipService::new(&state.db);
    let invites = membership.list_pending_invites(principal.id, &principal.email).await?;
    Ok(Json(invites.into_iter().map(Into::into).collect()))
}

pub async fn respond_invite(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    axum::extract::Path(invite_id): axum::extract::Path<uuid::Uuid>,
    Json(req): Json<RespondInviteRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let membership = firmante_auth::TenantMembershipService::new(&state.db);
    membership.respond_invite(principal.id, &principal.email, invite_id, req.accept).await?;
    Ok(Json(SuccessResponse::ok()))
}
