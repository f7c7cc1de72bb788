//! Plan catalog repository (spec §3 Plan).

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbPlan, DbResult};

pub struct PlanRepo;

impl PlanRepo {
    pub async fn find_by_slug<'c, E>(ex: E, slug: &str) -> DbResult<DbPlan>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbPlan>(
            "SELECT id, slug, price, user_limit, document_limit, features FROM plans WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("plan '{}'", slug)))
    }

    pub async fn find_by_id<'c, E>(ex: E, id: Uuid) -> DbResult<DbPlan>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbPlan>(
            "SELECT id, slug, price, user_limit, document_limit, features FROM plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(ex)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("plan {}", id)))
    }
}
