//! Share token repository (spec §3 ShareToken, §4.8 "Resolve token").

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbShareToken};

pub struct ShareTokenRepo;

impl ShareTokenRepo {
    pub async fn create<'c, E>(
        ex: E,
        document_id: Uuid,
        signer_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> DbResult<DbShareToken>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbShareToken>(
            r#"
            INSERT INTO share_tokens (document_id, signer_id, token_hash, expires_at, times_used)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING id, document_id, signer_id, token_hash, expires_at, times_used
            "#,
        )
        .bind(document_id)
        .bind(signer_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_hash<'c, E>(ex: E, token_hash: &str) -> DbResult<Option<DbShareToken>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbShareToken>(
            "SELECT id, document_id, signer_id, token_hash, expires_at, times_used FROM share_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn increment_times_used<'c, E>(ex: E, id: Uuid) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("UPDATE share_tokens SET times_used = times_used + 1 WHERE id = $1")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }
}
