//! API Routes
//!
//! Route definitions for all API endpoints (spec §6 HTTP surface).

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// All `/api` routes.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .nest("/auth", auth_routes())
        .nest("/tenants", tenant_routes())
        .nest("/documents", document_routes())
        .nest("/sign", sign_routes())
}

/// Identity & Session routes (C3).
fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
        .route("/switch-tenant", post(handlers::auth::switch_tenant))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
}

/// Tenant & Membership routes (C4).
fn tenant_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/my", get(handlers::tenant::my_tenant))
        .route("/available", get(handlers::tenant::available_tenants))
        .route("/invite", post(handlers::tenant::invite_member))
        .route("/invites", get(handlers::tenant::list_pending_invites))
        .route("/invites/:id/respond", post(handlers::tenant::respond_invite))
}

/// Document Store routes (C7), plus the C1 audit/verify-chain endpoints.
fn document_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::document::upload))
        .route("/", get(handlers::document::list))
        .route("/stats", get(handlers::document::stats))
        .route("/validate-file", post(handlers::document::validate_file))
        .route("/:id", get(handlers::document::get))
        .route("/:id/invite", post(handlers::document::invite_signers))
        .route("/:id/cancel", post(handlers::document::cancel))
        .route("/:id/expire", post(handlers::document::expire))
        .route("/:id/audit", get(handlers::document::audit))
        .route("/:id/verify-chain", get(handlers::document::verify_chain))
}

/// Signer Session & OTP + Signing Commit routes (C8/C9) — reached via
/// share token, not `Principal`.
fn sign_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:token", get(handlers::signer::summary))
        .route("/:token/identify", post(handlers::signer::identify))
        .route("/:token/otp/start", post(handlers::signer::start_otp))
        .route("/:token/otp/verify", post(handlers::signer::verify_otp))
        .route("/:token/commit", post(handlers::signer::commit))
}
