//! Signer repository (spec §3 Signer, §4.8 session & OTP, §4.9 commit).

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbSigner};

pub struct SignerRepo;

impl SignerRepo {
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'c, E>(
        ex: E,
        document_id: Uuid,
        name: &str,
        email: &str,
        cpf: Option<&str>,
        phone_e164: Option<&str>,
        qualification: Option<&str>,
        auth_channels: serde_json::Value,
        order_index: i32,
    ) -> DbResult<DbSigner>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbSigner>(
            r#"
            INSERT INTO signers
                (document_id, name, email, cpf, phone_e164, qualification, auth_channels, order_index, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'PENDING')
            RETURNING id, document_id, name, email, cpf, phone_e164, qualification, auth_channels,
                      order_index, status, signed_at, ip, signature_uuid, signature_hash,
                      signature_artefact_path, position_x, position_y, position_page
            "#,
        )
        .bind(document_id)
        .bind(name)
        .bind(email)
        .bind(cpf)
        .bind(phone_e164)
        .bind(qualification)
        .bind(auth_channels)
        .bind(order_index)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_id<'c, E>(ex: E, id: Uuid) -> DbResult<DbSigner>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbSigner>(&format!("{} WHERE id = $1", Self::columns()))
            .bind(id)
            .fetch_optional(ex)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("signer {}", id)))
    }

    /// Row-level lock variant used inside the §4.9 commit transaction when
    /// re-reading all signers to compute `allSigned`.
    pub async fn find_by_id_for_update<'c, E>(ex: E, id: Uuid) -> DbResult<DbSigner>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbSigner>(&format!("{} WHERE id = $1 FOR UPDATE", Self::columns()))
            .bind(id)
            .fetch_optional(ex)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("signer {}", id)))
    }

    pub async fn list_by_document<'c, E>(ex: E, document_id: Uuid) -> DbResult<Vec<DbSigner>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbSigner>(&format!(
            "{} WHERE document_id = $1 ORDER BY order_index ASC",
            Self::columns()
        ))
        .bind(document_id)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }

    /// PENDING → VIEWED on first successful resolve (spec §4.8 "Summary GET").
    pub async fn mark_viewed<'c, E>(ex: E, id: Uuid) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("UPDATE signers SET status = 'VIEWED' WHERE id = $1 AND status = 'PENDING'")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }

    /// §4.8 "Identify" — cpf?/phone? writes, nothing else.
    pub async fn update_identity<'c, E>(
        ex: E,
        id: Uuid,
        cpf: Option<&str>,
        phone_e164: Option<&str>,
    ) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("UPDATE signers SET cpf = COALESCE($2, cpf), phone_e164 = COALESCE($3, phone_e164) WHERE id = $1")
            .bind(id)
            .bind(cpf)
            .bind(phone_e164)
            .execute(ex)
            .await?;
        Ok(())
    }

    pub async fn update_position<'c, E>(
        ex: E,
        id: Uuid,
        position_x: f64,
        position_y: f64,
        position_page: i32,
    ) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query(
            "UPDATE signers SET position_x = $2, position_y = $3, position_page = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(position_x)
        .bind(position_y)
        .bind(position_page)
        .execute(ex)
        .await?;
        Ok(())
    }

    /// §4.9 step 4 — commit: flips PENDING/VIEWED → SIGNED with the
    /// derived signature artefact fields, guarded so a racing second commit
    /// on the same signer observes zero rows affected.
    #[allow(clippy::too_many_arguments)]
    pub async fn commit_signature<'c, E>(
        ex: E,
        id: Uuid,
        signed_at: DateTime<Utc>,
        signature_hash: &str,
        signature_artefact_path: &str,
        signature_uuid: Uuid,
        ip: Option<&str>,
    ) -> DbResult<bool>
    where
        E: PgExecutor<'c>,
    {
        let result = sqlx::query(
            r#"
            UPDATE signers
            SET status = 'SIGNED', signed_at = $2, signature_hash = $3,
                signature_artefact_path = $4, signature_uuid = $5, ip = $6
            WHERE id = $1 AND status IN ('PENDING', 'VIEWED')
            "#,
        )
        .bind(id)
        .bind(signed_at)
        .bind(signature_hash)
        .bind(signature_artefact_path)
        .bind(signature_uuid)
        .bind(ip)
        .execute(ex)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    fn columns() -> &'static str {
        "SELECT id, document_id, name, email, cpf, phone_e164, qualification, auth_channels, \
         order_index, status, signed_at, ip, signature_uuid, signature_hash, \
         signature_artefact_path, position_x, position_y, position_page FROM signers"
    }
}
