//! Refresh-credential repository (spec §3 Session, §4.3 Refresh/rotation).
//!
//! Distinct from any HTTP cookie session — this is the DB-backed record
//! that makes refresh-token rotation enforceable (each raw token usable
//! exactly once).

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbSession};

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create<'c, E>(
        ex: E,
        user_id: Uuid,
        tenant_id: Uuid,
        refresh_token_hash: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<DbSession>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbSession>(
            r#"
            INSERT INTO sessions (user_id, tenant_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, refresh_token_hash, tenant_id, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    /// All live sessions for a user — the caller locates the one whose
    /// `refresh_token_hash` matches the presented raw credential.
    pub async fn find_by_user<'c, E>(ex: E, user_id: Uuid) -> DbResult<Vec<DbSession>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbSession>(
            "SELECT id, user_id, refresh_token_hash, tenant_id, expires_at, created_at
             FROM sessions WHERE user_id = $1 AND expires_at > NOW()",
        )
        .bind(user_id)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn delete<'c, E>(ex: E, id: Uuid) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(ex)
            .await?;
        Ok(())
    }
}
