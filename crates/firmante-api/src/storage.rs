//! Filesystem layout helpers (spec §6).
//!
//! ```text
//! uploads/{tenantId}/{docId}{ext}                    original upload
//! uploads/{tenantId}/{docId}-signed{ext}             stamped PDF
//! uploads/{tenantId}/signatures/{signerId}.png        visual signature
//! certificates/{docId}.pdf                           completion certificate
//! ```
//!
//! Every function returns a path relative to the configured storage root
//! (`AppState::storage_root`); callers join it themselves before touching
//! the filesystem, matching the `storageKey` column which always holds a
//! relative path (spec §3 Document).

use std::path::{Path, PathBuf};

use uuid::Uuid;

use firmante_types::FirmanteError;

pub fn original_key(tenant_id: Uuid, document_id: Uuid, ext: &str) -> String {
    format!("uploads/{}/{}{}", tenant_id, document_id, ext)
}

pub fn signed_key(storage_key: &str, ext: &str) -> String {
    format!("{}-signed{}", strip_ext(storage_key, ext), ext)
}

pub fn signature_artefact_key(tenant_id: Uuid, signer_id: Uuid) -> String {
    format!("uploads/{}/signatures/{}.png", tenant_id, signer_id)
}

pub fn certificate_key(document_id: Uuid) -> String {
    format!("certificates/{}.pdf", document_id)
}

fn strip_ext<'a>(storage_key: &'a str, ext: &str) -> &'a str {
    storage_key.strip_suffix(ext).unwrap_or(storage_key)
}

/// Write `bytes` to `root/relative_key`, creating parent directories —
/// the persistence half of upload step 2 and commit step 3 (spec §4.7/§4.9).
pub async fn write_file(root: &Path, relative_key: &str, bytes: &[u8]) -> Result<(), FirmanteError> {
    let path = root.join(relative_key);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FirmanteError::internal(format!("creating {}: {}", parent.display(), e)))?;
    }
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| FirmanteError::internal(format!("writing {}: {}", path.display(), e)))
}

pub async fn read_file(root: &Path, relative_key: &str) -> Result<Vec<u8>, FirmanteError> {
    let path = root.join(relative_key);
    tokio::fs::read(&path)
        .await
        .map_err(|e| FirmanteError::internal(format!("reading {}: {}", path.display(), e)))
}

/// `.pdf`, `.docx`, … from an original filename, defaulting to `.bin`.
pub fn ext_from_filename(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| ".bin".to_string())
}

pub fn resolve(root: &Path, relative_key: &str) -> PathBuf {
    root.join(relative_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_key_layout() {
        let t = Uuid::nil();
        let d = Uuid::nil();
        assert_eq!(original_key(t, d, ".pdf"), format!("uploads/{}/{}.pdf", t, d));
    }

    #[test]
    fn test_signed_key_appends_suffix_before_extension() {
        assert_eq!(signed_key("uploads/t/d.pdf", ".pdf"), "uploads/t/d-signed.pdf");
    }

    #[test]
    fn test_ext_from_filename_defaults_when_missing() {
        assert_eq!(ext_from_filename("contrato"), ".bin");
        assert_eq!(ext_from_filename("contrato.pdf"), ".pdf");
    }
}
