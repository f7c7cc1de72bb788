//! Identity & Session handlers (spec §6, C3).

use std::sync::Arc;

use axum::{extract::State, Json};

use firmante_auth::{IdentityService, Principal, RegisterInput};

use crate::dto::{
    ForgotPasswordRequest, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
    ResetPasswordRequest, SuccessResponse, SwitchTenantRequest, TokenResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = IdentityService::new(&state.db, &state.jwt);
    let out = identity
        .register(RegisterInput {
            name: req.name,
            email: req.email,
            password: req.password,
            cpf: req.cpf,
            phone_e164: req.phone,
        })
        .await?;

    tracing::info!(user_id = %out.user_id, tenant_id = %out.tenant_id, "user registered");
    Ok(Json(TokenResponse::new(out.tokens, out.user_id, out.tenant_id)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = IdentityService::new(&state.db, &state.jwt);
    let out = identity.login(&req.email, &req.password).await?;

    tracing::info!(user_id = %out.user_id, "login succeeded");
    Ok(Json(TokenResponse::new(out.tokens, out.user_id, out.tenant_id)))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<firmante_auth::TokenPair>, ApiError> {
    let identity = IdentityService::new(&state.db, &state.jwt);
    let tokens = identity.refresh(&req.refresh_token).await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<LogoutRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let identity = IdentityService::new(&state.db, &state.jwt);
    identity.logout(principal.id, &req.refresh_token).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn switch_tenant(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<SwitchTenantRequest>,
) -> Result<Json<firmante_auth::TokenPair>, ApiError> {
    let identity = IdentityService::new(&state.db, &state.jwt);
    let tokens = identity.switch_tenant(principal.id, req.target_tenant_id).await?;
    Ok(Json(tokens))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let identity = IdentityService::new(&state.db, &state.jwt);
    identity.request_password_reset(&req.email, &req.channel).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let identity = IdentityService::new(&state.db, &state.jwt);
    identity.reset_password(&req.email, &req.otp, &req.new_password).await?;
    Ok(Json(SuccessResponse::ok()))
}
