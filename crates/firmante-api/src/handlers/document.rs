//! Document Store handlers (spec §4.7/§6, C7).

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use uuid::Uuid;

use firmante_auth::{authz::require_role, quota, Principal};
use firmante_crypto::sha256_hex;
use firmante_db::{AuditRepo, Database, DocumentRepo, FolderRepo, PlanRepo, TenantRepo, UserRepo};
use firmante_types::{status, FirmanteError};

use crate::dto::{
    DocumentResponse, DocumentStatsResponse, InviteSignersRequest, ListDocumentsQuery,
    RecentDocumentResponse, SuccessResponse, UploadDocumentQuery, ValidateFileResponse,
    ValidateFileSigner,
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage;

const WRITE_ROLES: &[&str] = &[status::ROLE_ADMIN, status::ROLE_MANAGER];
const READ_ROLES: &[&str] = &[status::ROLE_ADMIN, status::ROLE_MANAGER, status::ROLE_VIEWER];

/// **Upload** (spec §4.7): multipart `documentFile` plus optional
/// `title`/`deadlineAt`/`folderId` fields, gated by the C6 quota check.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    mut multipart: Multipart,
) -> Result<Json<DocumentResponse>, ApiError> {
    require_role(&principal, WRITE_ROLES)?;

    let tenant = TenantRepo::find_by_id(&state.db.pg, principal.tenant_id).await?;
    let plan = PlanRepo::find_by_id(&state.db.pg, tenant.plan_id).await?;
    quota::check_subscription(&plan, tenant.subscription_status.as_deref())?;
    quota::check_document_limit(&state.db.pg, principal.tenant_id, &plan).await?;

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name = String::new();
    let mut mime_type = "application/octet-stream".to_string();
    let mut query = UploadDocumentQuery { title: None, deadline_at: None, folder_id: None };

    while let Some(field) = multipart.next_field().await.map_err(|e| FirmanteError::validation(e.to_string()))? {
        match field.name().unwrap_or_default() {
            "documentFile" => {
                file_name = field.file_name().unwrap_or("document").to_string();
                mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                file_bytes = Some(field.bytes().await.map_err(|e| FirmanteError::validation(e.to_string()))?.to_vec());
            }
            "title" => query.title = Some(field.text().await.unwrap_or_default()),
            "folderId" => {
                if let Ok(text) = field.text().await {
                    query.folder_id = text.parse().ok();
                }
            }
            "deadlineAt" => {
                if let Ok(text) = field.text().await {
                    query.deadline_at = chrono::DateTime::parse_from_rfc3339(&text).ok().map(|d| d.with_timezone(&chrono::Utc));
                }
            }
            _ => {}
        }
    }

    let bytes = file_bytes.ok_or_else(|| FirmanteError::validation("documentFile is required"))?;
    if let Some(folder_id) = query.folder_id {
        FolderRepo::find_by_id_and_tenant(&state.db.pg, folder_id, principal.tenant_id).await?;
    }

    let mut tx = state.db.begin().await?;
    let title = query.title.unwrap_or_else(|| file_name.clone());
    let document = DocumentRepo::create(
        &mut *tx,
        principal.tenant_id,
        principal.id,
        query.folder_id,
        &title,
        &mime_type,
        bytes.len() as i64,
        query.deadline_at,
    )
    .await?;

    let ext = storage::ext_from_filename(&file_name);
    let storage_key = storage::original_key(principal.tenant_id, document.id, &ext);
    storage::write_file(&state.storage_root, &storage_key, &bytes).await?;
    let sha256 = sha256_hex(&bytes);

    DocumentRepo::finalize_upload(&mut *tx, document.id, &storage_key, &sha256).await?;

    AuditRepo::append(
        &mut tx,
        principal.tenant_id,
        status::ACTOR_USER,
        Some(principal.id),
        status::ENTITY_DOCUMENT,
        document.id,
        "STORAGE_UPLOADED",
        None,
        None,
        serde_json::json!({ "fileName": file_name, "sha256": sha256 }),
    )
    .await?;

    tx.commit().await.map_err(|e| firmante_db::DbError::Query(e))?;

    let document = DocumentRepo::find_by_id(&state.db.pg, document.id).await?;
    Ok(Json(document.into()))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(q): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    require_role(&principal, READ_ROLES)?;

    let statuses: &[&str] = match q.status.as_deref() {
        Some("pendentes") => &[status::DOC_READY, status::DOC_PARTIALLY_SIGNED],
        Some("concluidos") => &[status::DOC_SIGNED],
        Some("lixeira") => &[status::DOC_CANCELLED, status::DOC_EXPIRED],
        _ => &[status::DOC_DRAFT, status::DOC_READY, status::DOC_PARTIALLY_SIGNED, status::DOC_SIGNED, status::DOC_EXPIRED],
    };

    let docs = DocumentRepo::list_by_tenant_and_statuses(&state.db.pg, principal.tenant_id, statuses).await?;
    Ok(Json(docs.into_iter().map(Into::into).collect()))
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<DocumentStatsResponse>, ApiError> {
    require_role(&principal, READ_ROLES)?;

    let all = DocumentRepo::list_by_tenant_and_statuses(
        &state.db.pg,
        principal.tenant_id,
        &[status::DOC_DRAFT, status::DOC_READY, status::DOC_PARTIALLY_SIGNED, status::DOC_SIGNED, status::DOC_EXPIRED],
    )
    .await?;

    let pending = all.iter().filter(|d| d.status == status::DOC_READY || d.status == status::DOC_PARTIALLY_SIGNED).count() as i64;
    let signed = all.iter().filter(|d| d.status == status::DOC_SIGNED).count() as i64;
    let expired = all.iter().filter(|d| d.status == status::DOC_EXPIRED).count() as i64;
    let draft = all.iter().filter(|d| d.status == status::DOC_DRAFT).count() as i64;
    let total_size_bytes: i64 = all.iter().map(|d| d.size).sum();

    let recent = DocumentRepo::recent_with_owner(&state.db.pg, principal.tenant_id)
        .await?
        .into_iter()
        .map(|(d, owner_name)| RecentDocumentResponse { id: d.id, title: d.title, status: d.status, updated_at: d.updated_at, owner_name })
        .collect();

    Ok(Json(DocumentStatsResponse {
        pending,
        signed,
        expired,
        draft,
        total: all.len() as i64,
        total_size_bytes,
        recent,
    }))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    require_role(&principal, READ_ROLES)?;
    let document = find_in_tenant(&state.db, id, principal.tenant_id).await?;
    Ok(Json(document.into()))
}

/// **Invite signers** (spec §4.7/§6): attach signer rows plus per-signer
/// share tokens, fire invitation notifications.
pub async fn invite_signers(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<InviteSignersRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_role(&principal, WRITE_ROLES)?;
    let document = find_in_tenant(&state.db, id, principal.tenant_id).await?;

    if document.status != status::DOC_READY && document.status != status::DOC_PARTIALLY_SIGNED {
        return Err(FirmanteError::conflict("document is not accepting signers").into());
    }

    for (i, signer_input) in req.signers.iter().enumerate() {
        let auth_channels = serde_json::json!(signer_input.auth_channels);
        let signer = firmante_db::SignerRepo::create(
            &state.db.pg,
            document.id,
            &signer_input.name,
            &signer_input.email,
            signer_input.cpf.as_deref(),
            signer_input.phone.as_deref(),
            signer_input.qualification.as_deref(),
            auth_channels,
            i as i32,
        )
        .await?;

        let (raw_token, token_hash) = firmante_crypto::mint_share_token();
        let expires_at = chrono::Utc::now() + chrono::Duration::days(30);
        firmante_db::ShareTokenRepo::create(&state.db.pg, document.id, signer.id, &token_hash, expires_at).await?;

        let link = format!("{}/sign/{}", state.front_url, raw_token);
        let body = req.message.clone().unwrap_or_else(|| format!("Você tem um documento para assinar: {}", document.title));
        state
            .notifier
            .send_email(&state.db, principal.tenant_id, &signer_input.email, &format!("Assine: {}", document.title), &format!("{}<br>{}", body, link))
            .await;
    }

    Ok(Json(SuccessResponse::ok()))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_role(&principal, WRITE_ROLES)?;
    transition_status(&state.db, id, principal.tenant_id, principal.id, status::DOC_CANCELLED).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn expire(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    require_role(&principal, WRITE_ROLES)?;
    transition_status(&state.db, id, principal.tenant_id, principal.id, status::DOC_EXPIRED).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn audit(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<crate::dto::AuditEventResponse>>, ApiError> {
    require_role(&principal, READ_ROLES)?;
    let document = find_in_tenant(&state.db, id, principal.tenant_id).await?;
    let signer_ids = signer_ids_for(&state.db, document.id).await?;

    let events = AuditRepo::list_for_document_chain(&state.db.pg, document.id, &signer_ids).await?;
    Ok(Json(
        events
            .into_iter()
            .map(|e| crate::dto::AuditEventResponse {
                id: e.id,
                actor_kind: e.actor_kind,
                actor_id: e.actor_id,
                entity_type: e.entity_type,
                entity_id: e.entity_id,
                action: e.action,
                created_at: e.created_at,
            })
            .collect(),
    ))
}

/// `verifyChainForDocument` (spec §4.1 C1, exposed at `/documents/:id/verify-chain`).
pub async fn verify_chain(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<crate::dto::VerifyChainResponse>, ApiError> {
    require_role(&principal, READ_ROLES)?;
    let document = find_in_tenant(&state.db, id, principal.tenant_id).await?;
    let signer_ids = signer_ids_for(&state.db, document.id).await?;

    let result = AuditRepo::verify_document_chain(&state.db.pg, document.id, &signer_ids).await?;
    Ok(Json(crate::dto::VerifyChainResponse {
        is_valid: result.is_valid,
        count: result.count,
        broken_event_id: result.broken_event_id,
        reason: result.reason,
    }))
}

/// **Integrity re-check** (spec §4.7, public — no tenant scoping, since
/// the caller only ever has the bytes, never a document id).
pub async fn validate_file(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Result<Json<ValidateFileResponse>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| FirmanteError::validation(e.to_string()))? {
        if field.name() == Some("file") {
            bytes = field.bytes().await.map_err(|e| FirmanteError::validation(e.to_string()))?.to_vec();
        }
    }
    if bytes.is_empty() {
        return Err(FirmanteError::validation("file is required").into());
    }

    let hash_calculated = sha256_hex(&bytes);
    let Some(document) = DocumentRepo::find_by_sha256(&state.db.pg, &hash_calculated).await? else {
        return Ok(Json(ValidateFileResponse {
            valid: false,
            reason: Some("NOT_FOUND".to_string()),
            hash_calculated,
            title: None,
            signed_at: None,
            owner_name: None,
            signers: vec![],
        }));
    };

    if document.status != status::DOC_SIGNED {
        return Ok(Json(ValidateFileResponse {
            valid: false,
            reason: Some("NOT_SIGNED".to_string()),
            hash_calculated,
            title: None,
            signed_at: None,
            owner_name: None,
            signers: vec![],
        }));
    }

    let owner = UserRepo::find_by_id(&state.db.pg, document.owner_id).await?;
    let signers = firmante_db::SignerRepo::list_by_document(&state.db.pg, document.id)
        .await?
        .into_iter()
        .map(|s| ValidateFileSigner { name: s.name, email: s.email, status: s.status, signed_at: s.signed_at })
        .collect();

    Ok(Json(ValidateFileResponse {
        valid: true,
        reason: None,
        hash_calculated,
        title: Some(document.title),
        signed_at: Some(document.updated_at),
        owner_name: Some(owner.name),
        signers,
    }))
}

async fn find_in_tenant(db: &Database, id: Uuid, tenant_id: Uuid) -> Result<firmante_db::DbDocument, FirmanteError> {
    let document = DocumentRepo::find_by_id(&db.pg, id).await?;
    if document.tenant_id != tenant_id {
        return Err(FirmanteError::not_found("document"));
    }
    Ok(document)
}

async fn signer_ids_for(db: &Database, document_id: Uuid) -> Result<Vec<Uuid>, FirmanteError> {
    Ok(firmante_db::SignerRepo::list_by_document(&db.pg, document_id).await?.into_iter().map(|s| s.id).collect())
}

/// Shared CANCELLED/EXPIRED transition (spec §4.7 "Status machine").
async fn transition_status(db: &Database, id: Uuid, tenant_id: Uuid, actor_id: Uuid, new_status: &str) -> Result<(), FirmanteError> {
    let mut tx = db.begin().await?;
    let document = DocumentRepo::find_by_id(&mut *tx, id).await?;
    if document.tenant_id != tenant_id {
        return Err(FirmanteError::not_found("document"));
    }
    if document.status != status::DOC_READY && document.status != status::DOC_PARTIALLY_SIGNED {
        return Err(FirmanteError::conflict("document is not in a cancellable/expirable state"));
    }

    DocumentRepo::update_status(&mut *tx, id, new_status).await?;
    AuditRepo::append(
        &mut tx,
        tenant_id,
        status::ACTOR_USER,
        Some(actor_id),
        status::ENTITY_DOCUMENT,
        id,
        "STATUS_CHANGED",
        None,
        None,
        serde_json::json!({ "newStatus": new_status }),
    )
    .await?;

    tx.commit().await.map_err(|e| firmante_db::DbError::Query(e))?;
    Ok(())
}
