//! Firmante API — REST surface for the multi-tenant document-signing
//! backend (spec §6).
//!
//! - `/api/health`, `/api/ready` — liveness/readiness
//! - `/api/auth/*` — C3 Identity & Session
//! - `/api/tenants/*` — C4 Tenant & Membership
//! - `/api/documents/*` — C7 Document Store, plus C1 audit/verify-chain
//! - `/api/sign/:token/*` — C8/C9 Signer Session, OTP, Commit & Finalization

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod notify;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod storage;

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

/// Create the API router, wired to `state` and wrapped with CORS/trace
/// layers at the top level.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
