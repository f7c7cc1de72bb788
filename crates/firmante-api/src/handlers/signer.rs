//! Signer Session & OTP, Signing Commit & Finalization handlers
//! (spec §4.8/§4.9/§6, C8/C9).
//!
//! Every handler here is reached through a share token, never a
//! `Principal` — the caller is an unauthenticated signer holding a link,
//! not a logged-in tenant user.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use uuid::Uuid;

use firmante_crypto::{hash_token, mint_otp6, password_hash, password_verify, sha256_hex, short_code_from_hash};
use firmante_db::{
    AuditRepo, CertificateRepo, DbDocument, DbShareToken, DbSigner, Database, DocumentRepo,
    OtpCodeRepo, ShareTokenRepo, SignerRepo,
};
use firmante_types::{status, FirmanteError};

use crate::dto::{
    CommitSignatureRequest, CommitSignatureResponse, IdentifyRequest, SignerSessionResponse,
    SuccessResponse, VerifyOtpRequest,
};
use crate::error::ApiError;
use crate::extractors::ClientIp;
use crate::notify::render_template;
use crate::pdf::{DocumentStampInfo, SignerStampInput};
use crate::state::AppState;
use crate::storage;

/// Resolve a raw share-token path segment into its (document, signer, token)
/// triple, enforcing the §4.8 "Resolve token" fail conditions.
async fn resolve_token(db: &Database, raw_token: &str) -> Result<(DbDocument, DbSigner, DbShareToken), FirmanteError> {
    let hash = hash_token(raw_token);
    let token = ShareTokenRepo::find_by_hash(&db.pg, &hash)
        .await?
        .ok_or_else(|| FirmanteError::not_found("link"))?;

    if token.expires_at < Utc::now() {
        return Err(FirmanteError::Expired("share link has expired".to_string()));
    }

    let signer = SignerRepo::find_by_id(&db.pg, token.signer_id).await?;
    let document = DocumentRepo::find_by_id(&db.pg, signer.document_id).await?;

    if signer.status == status::SIGNER_SIGNED || signer.status == status::SIGNER_DECLINED {
        return Err(FirmanteError::LinkClosed("signer has already concluded".to_string()));
    }
    if matches!(document.status.as_str(), status::DOC_CANCELLED | status::DOC_EXPIRED | status::DOC_SIGNED) {
        return Err(FirmanteError::LinkClosed("document is no longer accepting signatures".to_string()));
    }

    Ok((document, signer, token))
}

/// **Summary GET** (spec §4.8): flips PENDING → VIEWED on first resolve.
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Path(raw_token): Path<String>,
) -> Result<Json<SignerSessionResponse>, ApiError> {
    let (document, signer, _token) = resolve_token(&state.db, &raw_token).await?;

    if signer.status == status::SIGNER_PENDING {
        SignerRepo::mark_viewed(&state.db.pg, signer.id).await?;
        let mut tx = state.db.begin().await?;
        AuditRepo::append(
            &mut tx,
            document.tenant_id,
            status::ACTOR_SIGNER,
            None,
            status::ENTITY_SIGNER,
            signer.id,
            "VIEWED",
            None,
            None,
            serde_json::json!({}),
        )
        .await?;
        tx.commit().await.map_err(firmante_db::DbError::Query)?;
    }

    let signer_status = if signer.status == status::SIGNER_PENDING { status::SIGNER_VIEWED.to_string() } else { signer.status };

    Ok(Json(SignerSessionResponse {
        document_title: document.title,
        document_status: document.status,
        signer_id: signer.id,
        signer_name: signer.name,
        signer_status,
    }))
}

/// **Identify** (spec §4.8): writes cpf/phone onto the signer row.
pub async fn identify(
    State(state): State<Arc<AppState>>,
    Path(raw_token): Path<String>,
    Json(req): Json<IdentifyRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (_document, signer, _token) = resolve_token(&state.db, &raw_token).await?;
    SignerRepo::update_identity(&state.db.pg, signer.id, req.cpf.as_deref(), req.phone.as_deref()).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// **Start OTP** (spec §4.8): mints a 6-digit code, persists its hash with
/// a 10-minute expiry, fires best-effort delivery, and always appends
/// OTP_SENT regardless of delivery outcome.
pub async fn start_otp(
    State(state): State<Arc<AppState>>,
    Path(raw_token): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (document, signer, _token) = resolve_token(&state.db, &raw_token).await?;

    let channel = if signer.auth_channels.as_array().map(|a| a.iter().any(|v| v == status::CHANNEL_WHATSAPP)).unwrap_or(false) && signer.phone_e164.is_some() {
        status::CHANNEL_WHATSAPP
    } else {
        status::CHANNEL_EMAIL
    };
    let recipient = if channel == status::CHANNEL_WHATSAPP { signer.phone_e164.clone().unwrap() } else { signer.email.clone() };

    let otp = mint_otp6();
    let code_hash = password_hash(&otp).map_err(|e| FirmanteError::internal(e.to_string()))?;
    let expires_at = Utc::now() + chrono::Duration::minutes(10);
    OtpCodeRepo::create(&state.db.pg, &recipient, channel, &code_hash, expires_at, status::CTX_SIGNING).await?;

    if channel == status::CHANNEL_WHATSAPP {
        state.notifier.send_whatsapp_text(&state.db, document.tenant_id, &recipient, &format!("Seu código de assinatura: {}", otp)).await;
    } else {
        state
            .notifier
            .send_email(&state.db, document.tenant_id, &recipient, "Código de assinatura", &format!("Seu código de assinatura: <b>{}</b>", otp))
            .await;
    }

    let masked = mask_recipient(&recipient);
    let mut tx = state.db.begin().await?;
    AuditRepo::append(
        &mut tx,
        document.tenant_id,
        status::ACTOR_SIGNER,
        None,
        status::ENTITY_SIGNER,
        signer.id,
        "OTP_SENT",
        None,
        None,
        serde_json::json!({ "channel": channel, "recipient": masked }),
    )
    .await?;
    tx.commit().await.map_err(firmante_db::DbError::Query)?;

    Ok(Json(SuccessResponse::ok()))
}

/// **Verify OTP** (spec §4.8): matches the most recent SIGNING-context
/// code for either the signer's email or phone, deletes it on success
/// (replay prevention), appends OTP_VERIFIED/OTP_FAILED either way.
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Path(raw_token): Path<String>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (document, signer, _token) = resolve_token(&state.db, &raw_token).await?;

    let by_email = OtpCodeRepo::find_latest_by_recipient_and_context(&state.db.pg, &signer.email, status::CTX_SIGNING).await?;
    let by_phone = match &signer.phone_e164 {
        Some(phone) => OtpCodeRepo::find_latest_by_recipient_and_context(&state.db.pg, phone, status::CTX_SIGNING).await?,
        None => None,
    };

    let candidate = [by_email, by_phone]
        .into_iter()
        .flatten()
        .max_by_key(|c| c.created_at);

    let verified = candidate.as_ref().is_some_and(|c| password_verify(&req.otp, &c.code_hash));

    let mut tx = state.db.begin().await?;
    if verified {
        let code = candidate.unwrap();
        OtpCodeRepo::delete(&mut *tx, code.id).await?;
        AuditRepo::append(
            &mut tx,
            document.tenant_id,
            status::ACTOR_SIGNER,
            None,
            status::ENTITY_SIGNER,
            signer.id,
            "OTP_VERIFIED",
            None,
            None,
            serde_json::json!({}),
        )
        .await?;
        tx.commit().await.map_err(firmante_db::DbError::Query)?;
        Ok(Json(SuccessResponse::ok()))
    } else {
        if let Some(code) = candidate {
            OtpCodeRepo::increment_attempts(&mut *tx, code.id).await?;
        }
        AuditRepo::append(
            &mut tx,
            document.tenant_id,
            status::ACTOR_SIGNER,
            None,
            status::ENTITY_SIGNER,
            signer.id,
            "OTP_FAILED",
            None,
            None,
            serde_json::json!({}),
        )
        .await?;
        tx.commit().await.map_err(firmante_db::DbError::Query)?;
        Err(FirmanteError::InvalidCredentials.into())
    }
}

/// **Commit** (spec §4.9): the 8-step signing-commit/finalization
/// algorithm. The hardest path in the surface — see the step-by-step
/// comments below.
pub async fn commit(
    State(state): State<Arc<AppState>>,
    Path(raw_token): Path<String>,
    client_ip: ClientIp,
    Json(req): Json<CommitSignatureRequest>,
) -> Result<Json<CommitSignatureResponse>, ApiError> {
    let (document, signer, _token) = resolve_token(&state.db, &raw_token).await?;

    if document.storage_key.is_none() || document.sha256.is_none() {
        return Err(FirmanteError::conflict("document has no stored content to sign").into());
    }
    let doc_sha256 = document.sha256.clone().unwrap();

    // Step 1: derive signatureHash / shortCode / signatureUuid.
    let signed_at = Utc::now();
    let signature_hash = sha256_hex(
        format!("{}{}{}{}", doc_sha256, signer.id, signed_at.to_rfc3339(), req.client_fingerprint).as_bytes(),
    );
    let short_code = short_code_from_hash(&signature_hash);
    let signature_uuid = Uuid::new_v4();

    // Step 2: persist the visual signature artefact.
    let artefact_bytes = STANDARD.decode(&req.signature_image).map_err(|e| FirmanteError::validation(e.to_string()))?;
    let artefact_key = storage::signature_artefact_key(document.tenant_id, signer.id);
    storage::write_file(&state.storage_root, &artefact_key, &artefact_bytes).await?;

    if let (Some(x), Some(y), Some(page)) = (req.position_x, req.position_y, req.position_page) {
        SignerRepo::update_position(&state.db.pg, signer.id, x, y, page).await?;
    }

    // Step 3: guarded commit — idempotent under a racing duplicate commit.
    let committed = SignerRepo::commit_signature(
        &state.db.pg,
        signer.id,
        signed_at,
        &signature_hash,
        &artefact_key,
        signature_uuid,
        Some(&client_ip.0),
    )
    .await?;
    if !committed {
        return Err(FirmanteError::conflict("signer has already signed").into());
    }

    let mut tx = state.db.begin().await?;
    AuditRepo::append(
        &mut tx,
        document.tenant_id,
        status::ACTOR_SIGNER,
        None,
        status::ENTITY_SIGNER,
        signer.id,
        "SIGNED",
        Some(&client_ip.0),
        None,
        serde_json::json!({ "shortCode": short_code }),
    )
    .await?;

    // Step 4: re-read every signer under row locks to compute allSigned.
    let all_signer_ids: Vec<Uuid> = SignerRepo::list_by_document(&mut *tx, document.id).await?.into_iter().map(|s| s.id).collect();
    let mut locked_signers = Vec::with_capacity(all_signer_ids.len());
    for id in &all_signer_ids {
        locked_signers.push(SignerRepo::find_by_id_for_update(&mut *tx, *id).await?);
    }
    let all_signed = locked_signers.iter().all(|s| s.status == status::SIGNER_SIGNED);

    if !all_signed {
        DocumentRepo::update_status(&mut *tx, document.id, status::DOC_PARTIALLY_SIGNED).await?;
        tx.commit().await.map_err(firmante_db::DbError::Query)?;
        return Ok(Json(CommitSignatureResponse { short_code, signature_hash, is_complete: false }));
    }

    // Re-lock the document row itself: two concurrent last-signer commits
    // can both observe all_signed=true from the signer rows above, but only
    // one may run finalization. The loser observes status already SIGNED
    // here and skips straight to commit instead of redoing the stamp/cert.
    let locked_document = DocumentRepo::find_by_id_for_update(&mut *tx, document.id).await?;
    if locked_document.status == status::DOC_SIGNED {
        tx.commit().await.map_err(firmante_db::DbError::Query)?;
        return Ok(Json(CommitSignatureResponse { short_code, signature_hash, is_complete: true }));
    }

    // Step 5-8: finalization — stamp, re-hash, finalize, certificate.
    let original_bytes = storage::read_file(&state.storage_root, document.storage_key.as_ref().unwrap()).await?;
    let mut stamp_inputs = Vec::with_capacity(locked_signers.len());
    for s in &locked_signers {
        stamp_inputs.push(SignerStampInput {
            name: s.name.clone(),
            cpf: s.cpf.clone(),
            email: s.email.clone(),
            signed_at: s.signed_at.unwrap_or(signed_at),
            ip: s.ip.clone(),
            signature_uuid: s.signature_uuid.unwrap_or(signature_uuid),
            artefact_path: s.signature_artefact_path.clone().unwrap_or_default(),
            position_x: s.position_x,
            position_y: s.position_y,
            position_page: s.position_page,
        });
    }

    let stamped = state
        .pdf_stamper
        .embed_signatures(original_bytes, stamp_inputs, DocumentStampInfo { document_id: document.id, document_sha256: doc_sha256.clone() })
        .await?;

    let ext = storage::ext_from_filename(document.storage_key.as_ref().unwrap());
    let signed_key = storage::signed_key(document.storage_key.as_ref().unwrap(), &ext);
    storage::write_file(&state.storage_root, &signed_key, &stamped).await?;
    let new_sha256 = sha256_hex(&stamped);

    DocumentRepo::finalize_signing(&mut *tx, document.id, &signed_key, &new_sha256).await?;

    let cert_issued_at = Utc::now();
    let cert_sha256 = sha256_hex(format!("CERT-{}-{}", document.id, cert_issued_at.to_rfc3339()).as_bytes());
    let cert_storage_key = storage::certificate_key(document.id);
    CertificateRepo::create(&mut *tx, document.id, &cert_storage_key, &cert_sha256, cert_issued_at).await?;

    AuditRepo::append(
        &mut tx,
        document.tenant_id,
        status::ACTOR_SYSTEM,
        None,
        status::ENTITY_DOCUMENT,
        document.id,
        "CERTIFICATE_ISSUED",
        None,
        None,
        serde_json::json!({ "sha256": cert_sha256 }),
    )
    .await?;

    tx.commit().await.map_err(firmante_db::DbError::Query)?;

    // Best-effort completion-email fan out — never blocks the response.
    let doc_link = format!("{}/documents/{}", state.front_url, document.id);
    let template = tenant_final_template(&state.db, document.tenant_id).await;
    for s in &locked_signers {
        let body = render_template(&template, &s.name, &document.title, &doc_link, document.id);
        state
            .notifier
            .send_email(&state.db, document.tenant_id, &s.email, &format!("Documento concluído: {}", document.title), &body)
            .await;
    }

    Ok(Json(CommitSignatureResponse { short_code, signature_hash, is_complete: true }))
}

async fn tenant_final_template(db: &Database, tenant_id: Uuid) -> String {
    const DEFAULT_TEMPLATE: &str =
        "Olá {{signer_name}}, o documento \"{{doc_title}}\" foi assinado por todas as partes. Acesse: {{doc_link}}";

    firmante_db::TenantSettingsRepo::find_by_tenant(&db.pg, tenant_id)
        .await
        .ok()
        .flatten()
        .and_then(|s| s.final_email_template)
        .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string())
}

fn mask_recipient(recipient: &str) -> String {
    if let Some((local, domain)) = recipient.split_once('@') {
        let visible = local.chars().take(2).collect::<String>();
        format!("{}***@{}", visible, domain)
    } else {
        let len = recipient.len();
        if len <= 4 {
            "***".to_string()
        } else {
            format!("{}***{}", &recipient[..2], &recipient[len - 2..])
        }
    }
}
