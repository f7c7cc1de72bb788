//! One-time code repository (spec §3 OtpCode, §4.6 password reset, §4.8 signer OTP).

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbOtpCode};

pub struct OtpCodeRepo;

impl OtpCodeRepo {
    pub async fn create<'c, E>(
        ex: E,
        recipient: &str,
        channel: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
        context: &str,
    ) -> DbResult<DbOtpCode>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbOtpCode>(
            r#"
            INSERT INTO otp_codes (recipient, channel, code_hash, expires_at, attempts, context)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING id, recipient, channel, code_hash, expires_at, attempts, context, created_at
            "#,
        )
        .bind(recipient)
        .bind(channel)
        .bind(code_hash)
        .bind(expires_at)
        .bind(context)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Most recent code for a recipient within a context — "recipient" may
    /// be the signer's email or phone; callers try both per spec §4.8.
    pub async fn find_latest_by_recipient_and_context<'c, E>(
        ex: E,
        recipient: &str,
        context: &str,
    ) -> DbResult<Option<DbOtpCode>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbOtpCode>(
            r#"
            SELECT id, recipient, channel, code_hash, expires_at, attempts, context, created_at
            FROM otp_codes
            WHERE recipient = $1 AND context = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(recipient)
        .bind(context)
        .fetch_optional(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Replay prevention (spec §4.8, invariant 5): delete on successful verify.
    pub async fn delete<'c, E>(ex: E, id: Uuid) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("DELETE FROM otp_codes WHERE id = $1")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }

    pub async fn increment_attempts<'c, E>(ex: E, id: Uuid) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("UPDATE otp_codes SET attempts = attempts + 1 WHERE id = $1")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }
}
