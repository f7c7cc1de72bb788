//! PDF stamping collaborator (spec §4.9 step 8b, §6 "interface, not
//! implementation").
//!
//! The spec deliberately leaves PDF rendering external: `embedSignatures`
//! is a collaborator this crate calls, not a library it vendors. No real
//! PDF-rendering crate is wired in here — callers supply an
//! `Arc<dyn PdfStamper>`, and a production deployment points that at
//! whatever rendering service or process it already operates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use firmante_types::FirmanteError;

/// Per-signer fields the stamping collaborator needs to render one
/// signature block (spec §4.9 step 8b).
#[derive(Debug, Clone)]
pub struct SignerStampInput {
    pub name: String,
    pub cpf: Option<String>,
    pub email: String,
    pub signed_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub signature_uuid: Uuid,
    pub artefact_path: String,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub position_page: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct DocumentStampInfo {
    pub document_id: Uuid,
    pub document_sha256: String,
}

/// `embedSignatures(originalPdfBytes, signers[], docInfo) → stampedPdfBytes`.
#[async_trait]
pub trait PdfStamper: Send + Sync {
    async fn embed_signatures(
        &self,
        original_pdf_bytes: Vec<u8>,
        signers: Vec<SignerStampInput>,
        doc_info: DocumentStampInfo,
    ) -> Result<Vec<u8>, FirmanteError>;
}

/// No-op stamper used where no real rendering service is configured —
/// appends nothing, returns the input bytes untouched. Never wired into a
/// production `AppState`; exists so the finalization path in
/// `handlers::signer` has something to depend on while the real
/// collaborator is deployed and pointed at separately.
pub struct PassthroughStamper;

#[async_trait]
impl PdfStamper for PassthroughStamper {
    async fn embed_signatures(
        &self,
        original_pdf_bytes: Vec<u8>,
        _signers: Vec<SignerStampInput>,
        _doc_info: DocumentStampInfo,
    ) -> Result<Vec<u8>, FirmanteError> {
        Ok(original_pdf_bytes)
    }
}
