//! Signer Session & OTP, Signing Commit DTOs (spec §6, C8/C9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerSessionResponse {
    pub document_title: String,
    pub document_status: String,
    pub signer_id: Uuid,
    pub signer_name: String,
    pub signer_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyRequest {
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSignatureRequest {
    pub client_fingerprint: String,
    /// Base64-encoded PNG of the rendered signature.
    pub signature_image: String,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    #[serde(default)]
    pub position_page: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSignatureResponse {
    pub short_code: String,
    pub signature_hash: String,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventResponse {
    pub id: Uuid,
    pub actor_kind: String,
    pub actor_id: Option<Uuid>,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyChainResponse {
    pub is_valid: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_event_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
