//! Request-level extractors that aren't the `Principal` auth gate.
//!
//! `Principal` itself lives in `firmante_auth::authz` (implemented generically
//! over any `AuthState`) and is re-exported from `lib.rs` for handler use.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Best-effort client IP from common proxy headers, for audit entries
/// (spec §3 AuditEvent `ip`).
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        let ip = headers
            .get("CF-Connecting-IP")
            .or_else(|| headers.get("X-Real-IP"))
            .or_else(|| headers.get("X-Forwarded-For"))
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientIp(ip))
    }
}
