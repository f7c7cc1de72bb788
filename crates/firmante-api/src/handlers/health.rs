//! Health Check Handlers
//!
//! Endpoints for service health monitoring.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: ComponentStatus,
    pub redis: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Lightweight liveness check — doesn't verify dependencies.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy".to_string(), version: env!("CARGO_PKG_VERSION").to_string() })
}

/// Verifies Postgres and Redis connectivity.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let mut all_healthy = true;

    let db_status = match state.db.health_check().await {
        Ok(health) if health.postgres => {
            ComponentStatus { name: "PostgreSQL".to_string(), status: "healthy".to_string(), error: None }
        }
        Ok(_) => {
            all_healthy = false;
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "unhealthy".to_string(),
                error: Some("PostgreSQL health check failed".to_string()),
            }
        }
        Err(e) => {
            all_healthy = false;
            ComponentStatus { name: "PostgreSQL".to_string(), status: "unhealthy".to_string(), error: Some(e.to_string()) }
        }
    };

    let redis_status = match state.db.health_check().await {
        Ok(health) if health.redis => ComponentStatus { name: "Redis".to_string(), status: "healthy".to_string(), error: None },
        _ => {
            all_healthy = false;
            ComponentStatus {
                name: "Redis".to_string(),
                status: "unhealthy".to_string(),
                error: Some("Redis health check failed".to_string()),
            }
        }
    };

    let status_code = if all_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let overall_status = if all_healthy { "ready" } else { "not_ready" };

    (status_code, Json(ReadinessResponse { status: overall_status.to_string(), database: db_status, redis: redis_status }))
}
