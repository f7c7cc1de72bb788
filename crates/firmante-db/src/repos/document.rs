//! Document repository (spec §3 Document, §4.7 status machine & stats,
//! §4.9 finalization, §4.10 reminder hook).

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbDocument};

pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create<'c, E>(
        ex: E,
        tenant_id: Uuid,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        title: &str,
        mime_type: &str,
        size: i64,
        deadline_at: Option<DateTime<Utc>>,
    ) -> DbResult<DbDocument>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbDocument>(
            r#"
            INSERT INTO documents
                (tenant_id, owner_id, folder_id, title, mime_type, size, deadline_at, auto_reminders, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, true, 'DRAFT')
            RETURNING id, tenant_id, owner_id, folder_id, title, storage_key, mime_type, size,
                      sha256, deadline_at, auto_reminders, status, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(owner_id)
        .bind(folder_id)
        .bind(title)
        .bind(mime_type)
        .bind(size)
        .bind(deadline_at)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_id<'c, E>(ex: E, id: Uuid) -> DbResult<DbDocument>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbDocument>(&format!("{} WHERE id = $1", Self::columns()))
            .bind(id)
            .fetch_optional(ex)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("document {}", id)))
    }

    /// Row-level lock variant for the §4.9 finalization race: selects the
    /// document FOR UPDATE so two concurrent last-signer commits serialize
    /// on this row before either observes the other's status write.
    pub async fn find_by_id_for_update<'c, E>(ex: E, id: Uuid) -> DbResult<DbDocument>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbDocument>(&format!("{} WHERE id = $1 FOR UPDATE", Self::columns()))
            .bind(id)
            .fetch_optional(ex)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("document {}", id)))
    }

    /// Step 2/4 of upload: attach the persisted storage key, sha256, and
    /// flip DRAFT → READY.
    pub async fn finalize_upload<'c, E>(
        ex: E,
        id: Uuid,
        storage_key: &str,
        sha256: &str,
    ) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query(
            "UPDATE documents SET storage_key = $2, sha256 = $3, status = 'READY', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(storage_key)
        .bind(sha256)
        .execute(ex)
        .await?;
        Ok(())
    }

    pub async fn update_status<'c, E>(ex: E, id: Uuid, status: &str) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("UPDATE documents SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(ex)
            .await?;
        Ok(())
    }

    /// Step e of §4.9's finalization: new storage key, new sha256, SIGNED.
    pub async fn finalize_signing<'c, E>(
        ex: E,
        id: Uuid,
        storage_key: &str,
        sha256: &str,
    ) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query(
            "UPDATE documents SET storage_key = $2, sha256 = $3, status = 'SIGNED', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(storage_key)
        .bind(sha256)
        .execute(ex)
        .await?;
        Ok(())
    }

    pub async fn count_by_tenant<'c, E>(ex: E, tenant_id: Uuid) -> DbResult<i64>
    where
        E: PgExecutor<'c>,
    {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM documents WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(ex)
                .await?;
        Ok(count)
    }

    /// Listing filtered by status set, most recent first (spec §4.7).
    pub async fn list_by_tenant_and_statuses<'c, E>(
        ex: E,
        tenant_id: Uuid,
        statuses: &[&str],
    ) -> DbResult<Vec<DbDocument>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbDocument>(&format!(
            "{} WHERE tenant_id = $1 AND status = ANY($2) ORDER BY created_at DESC",
            Self::columns()
        ))
        .bind(tenant_id)
        .bind(statuses)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_sha256<'c, E>(ex: E, sha256: &str) -> DbResult<Option<DbDocument>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbDocument>(&format!("{} WHERE sha256 = $1", Self::columns()))
            .bind(sha256)
            .fetch_optional(ex)
            .await
            .map_err(DbError::Query)
    }

    /// §4.10: due for reminder within the next 24h.
    pub async fn find_due_reminders<'c, E>(ex: E, now: DateTime<Utc>) -> DbResult<Vec<DbDocument>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbDocument>(&format!(
            r#"{} WHERE status IN ('READY', 'PARTIALLY_SIGNED') AND auto_reminders = true
               AND deadline_at IS NOT NULL AND deadline_at > $1 AND deadline_at <= $1 + INTERVAL '24 hours'"#,
            Self::columns()
        ))
        .bind(now)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }

    /// §4.10: overdue documents to transition to EXPIRED.
    pub async fn find_overdue<'c, E>(ex: E, now: DateTime<Utc>) -> DbResult<Vec<DbDocument>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbDocument>(&format!(
            "{} WHERE status IN ('READY', 'PARTIALLY_SIGNED') AND deadline_at IS NOT NULL AND deadline_at < $1",
            Self::columns()
        ))
        .bind(now)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Five most-recently-updated documents with their owner's name, for
    /// the §4.7 stats endpoint.
    pub async fn recent_with_owner<'c, E>(
        ex: E,
        tenant_id: Uuid,
    ) -> DbResult<Vec<(DbDocument, String)>>
    where
        E: PgExecutor<'c>,
    {
        let rows: Vec<(
            Uuid, Uuid, Uuid, Option<Uuid>, String, Option<String>, String, i64,
            Option<String>, Option<DateTime<Utc>>, bool, String, DateTime<Utc>, DateTime<Utc>, String,
        )> = sqlx::query_as(
            r#"
            SELECT d.id, d.tenant_id, d.owner_id, d.folder_id, d.title, d.storage_key, d.mime_type,
                   d.size, d.sha256, d.deadline_at, d.auto_reminders, d.status, d.created_at,
                   d.updated_at, u.name
            FROM documents d
            JOIN users u ON u.id = d.owner_id
            WHERE d.tenant_id = $1 AND d.status != 'CANCELLED'
            ORDER BY d.updated_at DESC
            LIMIT 5
            "#,
        )
        .bind(tenant_id)
        .fetch_all(ex)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, tenant_id, owner_id, folder_id, title, storage_key, mime_type, size,
                sha256, deadline_at, auto_reminders, status, created_at, updated_at, owner_name)| {
                (
                    DbDocument {
                        id, tenant_id, owner_id, folder_id, title, storage_key, mime_type, size,
                        sha256, deadline_at, auto_reminders, status, created_at, updated_at,
                    },
                    owner_name,
                )
            })
            .collect())
    }

    fn columns() -> &'static str {
        "SELECT id, tenant_id, owner_id, folder_id, title, storage_key, mime_type, size, sha256, \
         deadline_at, auto_reminders, status, created_at, updated_at FROM documents"
    }
}
