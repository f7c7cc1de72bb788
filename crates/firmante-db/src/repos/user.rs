//! User repository (spec §3 User).

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{DbError, DbResult, DbUser};

pub struct UserRepo;

impl UserRepo {
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'c, E>(
        ex: E,
        tenant_id: Uuid,
        name: &str,
        email: &str,
        cpf: Option<&str>,
        phone_e164: Option<&str>,
        password_hash: &str,
        role: &str,
    ) -> DbResult<DbUser>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (tenant_id, name, email, cpf, phone_e164, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'ACTIVE')
            RETURNING id, tenant_id, name, email, cpf, phone_e164, password_hash, role, status,
                      created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(email)
        .bind(cpf)
        .bind(phone_e164)
        .bind(password_hash)
        .bind(role)
        .fetch_one(ex)
        .await
        .map_err(|e| translate_unique_violation(e, email, cpf))
    }

    pub async fn find_by_id<'c, E>(ex: E, id: Uuid) -> DbResult<DbUser>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbUser>(&format!("{} WHERE id = $1", Self::columns()))
            .bind(id)
            .fetch_optional(ex)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
    }

    pub async fn find_by_email<'c, E>(ex: E, email: &str) -> DbResult<Option<DbUser>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbUser>(&format!("{} WHERE email = $1", Self::columns()))
            .bind(email)
            .fetch_optional(ex)
            .await
            .map_err(DbError::Query)
    }

    pub async fn find_by_cpf<'c, E>(ex: E, cpf: &str) -> DbResult<Option<DbUser>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbUser>(&format!("{} WHERE cpf = $1", Self::columns()))
            .bind(cpf)
            .fetch_optional(ex)
            .await
            .map_err(DbError::Query)
    }

    pub async fn update_password<'c, E>(ex: E, user_id: Uuid, password_hash: &str) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(ex)
            .await?;
        Ok(())
    }

    /// Number of ACTIVE users whose *personal* tenant is `tenant_id` — half
    /// of the occupancy count in spec §4.4/§4.6.
    pub async fn count_active_by_tenant<'c, E>(ex: E, tenant_id: Uuid) -> DbResult<i64>
    where
        E: PgExecutor<'c>,
    {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE tenant_id = $1 AND status = 'ACTIVE'",
        )
        .bind(tenant_id)
        .fetch_one(ex)
        .await?;
        Ok(count)
    }

    fn columns() -> &'static str {
        "SELECT id, tenant_id, name, email, cpf, phone_e164, password_hash, role, status, created_at, updated_at FROM users"
    }
}

fn translate_unique_violation(e: sqlx::Error, email: &str, cpf: Option<&str>) -> DbError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("users_email_key") => return DbError::Duplicate(format!("email {} already in use", email)),
            Some("users_cpf_key") => {
                return DbError::Duplicate(format!(
                    "cpf {} already in use",
                    cpf.unwrap_or_default()
                ))
            }
            _ => {}
        }
    }
    DbError::Query(e)
}
