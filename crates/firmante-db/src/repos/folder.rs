//! Folder repository (spec §3 Folder).

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbFolder, DbResult};

pub struct FolderRepo;

impl FolderRepo {
    pub async fn create<'c, E>(
        ex: E,
        tenant_id: Uuid,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        color: &str,
    ) -> DbResult<DbFolder>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbFolder>(
            r#"
            INSERT INTO folders (tenant_id, owner_id, parent_id, name, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, tenant_id, owner_id, parent_id, name, color
            "#,
        )
        .bind(tenant_id)
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .bind(color)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Fetch a folder scoped to a tenant — used to validate that a
    /// `folderId` on upload (spec §4.7 step 1) actually belongs to the
    /// uploading tenant.
    pub async fn find_by_id_and_tenant<'c, E>(
        ex: E,
        id: Uuid,
        tenant_id: Uuid,
    ) -> DbResult<DbFolder>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbFolder>(
            "SELECT id, tenant_id, owner_id, parent_id, name, color FROM folders WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("folder {}", id)))
    }

    pub async fn list_by_tenant<'c, E>(ex: E, tenant_id: Uuid) -> DbResult<Vec<DbFolder>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbFolder>(
            "SELECT id, tenant_id, owner_id, parent_id, name, color FROM folders WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }
}
