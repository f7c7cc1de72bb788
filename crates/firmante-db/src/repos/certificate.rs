//! Certificate repository (spec §3 Certificate, §4.9 step 8f).

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbCertificate, DbError, DbResult};

pub struct CertificateRepo;

impl CertificateRepo {
    pub async fn create<'c, E>(
        ex: E,
        document_id: Uuid,
        storage_key: &str,
        sha256: &str,
        issued_at: DateTime<Utc>,
    ) -> DbResult<DbCertificate>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbCertificate>(
            r#"
            INSERT INTO certificates (document_id, storage_key, sha256, issued_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, document_id, storage_key, sha256, issued_at
            "#,
        )
        .bind(document_id)
        .bind(storage_key)
        .bind(sha256)
        .bind(issued_at)
        .fetch_one(ex)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("certificates_document_id_key") {
                    return DbError::Duplicate(format!(
                        "document {} already has a certificate",
                        document_id
                    ));
                }
            }
            DbError::Query(e)
        })
    }

    pub async fn find_by_document<'c, E>(ex: E, document_id: Uuid) -> DbResult<Option<DbCertificate>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbCertificate>(
            "SELECT id, document_id, storage_key, sha256, issued_at FROM certificates WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_optional(ex)
        .await
        .map_err(DbError::Query)
    }
}
