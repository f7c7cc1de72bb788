//! Row types returned by the repositories.
//!
//! Every `Db*` struct mirrors a table one-for-one via `FromRow`. None of
//! these carry behavior; business rules live in the service layer that
//! calls the repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbPlan {
    pub id: Uuid,
    pub slug: String,
    pub price: rust_decimal::Decimal,
    pub user_limit: i32,
    pub document_limit: i32,
    pub features: serde_json::Value,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTenant {
    pub id: Uuid,
    pub display_name: String,
    pub slug: String,
    pub status: String,
    pub plan_id: Uuid,
    pub asaas_customer_id: Option<String>,
    pub asaas_subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: Option<String>,
    pub phone_e164: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of [`DbUser`] used on every read path. See DESIGN.md — the
/// password hash is only ever touched by the login and change-password
/// code paths, never serialized back to a client.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithoutSecrets {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: Option<String>,
    pub phone_e164: Option<String>,
    pub role: String,
    pub status: String,
}

impl From<DbUser> for UserWithoutSecrets {
    fn from(u: DbUser) -> Self {
        Self {
            id: u.id,
            tenant_id: u.tenant_id,
            name: u.name,
            email: u.email,
            cpf: u.cpf,
            phone_e164: u.phone_e164,
            role: u.role,
            status: u.status,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTenantMember {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub role: String,
    pub status: String,
    pub invited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub tenant_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbOtpCode {
    pub id: Uuid,
    pub recipient: String,
    pub channel: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub context: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbDocument {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    pub storage_key: Option<String>,
    pub mime_type: String,
    pub size: i64,
    pub sha256: Option<String>,
    pub deadline_at: Option<DateTime<Utc>>,
    pub auto_reminders: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbFolder {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbSigner {
    pub id: Uuid,
    pub document_id: Uuid,
    pub name: String,
    pub email: String,
    pub cpf: Option<String>,
    pub phone_e164: Option<String>,
    pub qualification: Option<String>,
    pub auth_channels: serde_json::Value,
    pub order_index: i32,
    pub status: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub ip: Option<String>,
    pub signature_uuid: Option<Uuid>,
    pub signature_hash: Option<String>,
    pub signature_artefact_path: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub position_page: Option<i32>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbShareToken {
    pub id: Uuid,
    pub document_id: Uuid,
    pub signer_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub times_used: i32,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbAuditLog {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor_kind: String,
    pub actor_id: Option<Uuid>,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub payload_json: serde_json::Value,
    pub prev_event_hash: String,
    pub event_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbCertificate {
    pub id: Uuid,
    pub document_id: Uuid,
    pub storage_key: String,
    pub sha256: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbTenantSettings {
    pub tenant_id: Uuid,
    pub app_name: String,
    pub primary_color: String,
    pub logo_url: Option<String>,
    pub zapi_instance_id: Option<String>,
    pub zapi_token: Option<String>,
    pub zapi_client_token: Option<String>,
    pub zapi_active: bool,
    pub resend_api_key: Option<String>,
    pub resend_active: bool,
    pub final_email_template: Option<String>,
}
