//! Audit log repository (spec §3 AuditLog, §4.1) — the DB-facing half of
//! the hash chain. The pure hashing/verification algorithm lives in
//! `firmante-audit`; this module does the "find the latest prior event
//! for entityId" lookup and the insert, and feeds stored rows back
//! through `firmante_audit::verify_chain`.

use chrono::Utc;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use firmante_audit::{compute_event_hash, genesis_hash, verify_chain, AuditFields, ChainEvent, VerifyResult};

use crate::{DbAuditLog, DbError, DbResult};

pub struct AuditRepo;

impl AuditRepo {
    /// `appendEvent` (spec §4.1). Takes the connection directly (rather
    /// than the generic `PgExecutor` used elsewhere in this crate) because
    /// the "latest prior event" read and this insert must run as two
    /// sequential statements on the same connection — the serialization
    /// point for concurrent appends against the same `entity_id` (spec §5).
    /// Callers reach this through an open transaction's `&mut *tx`.
    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        ex: &mut PgConnection,
        tenant_id: Uuid,
        actor_kind: &str,
        actor_id: Option<Uuid>,
        entity_type: &str,
        entity_id: Uuid,
        action: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
        payload: serde_json::Value,
    ) -> DbResult<DbAuditLog> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT event_hash FROM audit_logs WHERE entity_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(entity_id)
        .fetch_optional(&mut *ex)
        .await?;
        let prev = row.map(|(h,)| h).unwrap_or_else(genesis_hash);

        let created_at = Utc::now();
        let fields = AuditFields {
            actor_kind: actor_kind.to_string(),
            actor_id,
            entity_type: entity_type.to_string(),
            entity_id,
            action: action.to_string(),
            ip: ip.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            payload: payload.clone(),
            created_at,
        };
        let event_hash = compute_event_hash(&prev, &fields);

        sqlx::query_as::<_, DbAuditLog>(
            r#"
            INSERT INTO audit_logs
                (tenant_id, actor_kind, actor_id, entity_type, entity_id, action, ip, user_agent,
                 payload_json, prev_event_hash, event_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, tenant_id, actor_kind, actor_id, entity_type, entity_id, action, ip,
                      user_agent, payload_json, prev_event_hash, event_hash, created_at
            "#,
        )
        .bind(tenant_id)
        .bind(actor_kind)
        .bind(actor_id)
        .bind(entity_type)
        .bind(entity_id)
        .bind(action)
        .bind(ip)
        .bind(user_agent)
        .bind(payload)
        .bind(&prev)
        .bind(&event_hash)
        .bind(created_at)
        .fetch_one(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Events for a document's chain: its own entries plus every entry for
    /// its signers (spec §4.1 `verifyChainForDocument`), ordered ascending.
    pub async fn list_for_document_chain<'c, E>(
        ex: E,
        document_id: Uuid,
        signer_ids: &[Uuid],
    ) -> DbResult<Vec<DbAuditLog>>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query_as::<_, DbAuditLog>(
            r#"
            SELECT id, tenant_id, actor_kind, actor_id, entity_type, entity_id, action, ip,
                   user_agent, payload_json, prev_event_hash, event_hash, created_at
            FROM audit_logs
            WHERE (entity_type = 'DOCUMENT' AND entity_id = $1)
               OR (entity_type = 'SIGNER' AND entity_id = ANY($2))
            ORDER BY created_at ASC
            "#,
        )
        .bind(document_id)
        .bind(signer_ids)
        .fetch_all(ex)
        .await
        .map_err(DbError::Query)
    }

    /// Runs the pure verification algorithm against stored rows — the
    /// repository-level entry point for `verifyChainForDocument`.
    pub async fn verify_document_chain<'c, E>(
        ex: E,
        document_id: Uuid,
        signer_ids: &[Uuid],
    ) -> DbResult<VerifyResult>
    where
        E: PgExecutor<'c>,
    {
        let rows = Self::list_for_document_chain(ex, document_id, signer_ids).await?;
        let events: Vec<ChainEvent> = rows.into_iter().map(to_chain_event).collect();
        Ok(verify_chain(&events))
    }
}

fn to_chain_event(row: DbAuditLog) -> ChainEvent {
    ChainEvent {
        id: row.id,
        fields: AuditFields {
            actor_kind: row.actor_kind,
            actor_id: row.actor_id,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            action: row.action,
            ip: row.ip,
            user_agent: row.user_agent,
            payload: row.payload_json,
            created_at: row.created_at,
        },
        prev_event_hash: row.prev_event_hash,
        event_hash: row.event_hash,
    }
}
