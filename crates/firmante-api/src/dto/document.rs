//! Document Store DTOs (spec §6, C7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use firmante_db::DbDocument;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub deadline_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListDocumentsQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
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

impl From<DbDocument> for DocumentResponse {
    fn from(d: DbDocument) -> Self {
        Self {
            id: d.id,
            tenant_id: d.tenant_id,
            owner_id: d.owner_id,
            folder_id: d.folder_id,
            title: d.title,
            storage_key: d.storage_key,
            mime_type: d.mime_type,
            size: d.size,
            sha256: d.sha256,
            deadline_at: d.deadline_at,
            auto_reminders: d.auto_reminders,
            status: d.status,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatsResponse {
    pub pending: i64,
    pub signed: i64,
    pub expired: i64,
    pub draft: i64,
    pub total: i64,
    pub total_size_bytes: i64,
    pub recent: Vec<RecentDocumentResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDocumentResponse {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
    pub owner_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteSignersRequest {
    pub signers: Vec<SignerInput>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub auth_channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateFileResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub hash_calculated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub signers: Vec<ValidateFileSigner>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateFileSigner {
    pub name: String,
    pub email: String,
    pub status: String,
    pub signed_at: Option<DateTime<Utc>>,
}
