//! Firmante Audit — the pure, storage-agnostic half of the tamper-evident
//! audit chain (C1, spec §4.1).
//!
//! This crate owns the hash algorithm only: given the previous event's
//! hash and the fields of a new event, compute the new event's hash, and
//! given a sequence of persisted events, walk and verify the chain. The
//! actual row storage (finding "the latest prior event for entityId",
//! persisting inside a transaction, serializing concurrent appends) lives
//! in `firmante-db::repos::audit`, which calls into this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// The fixed set of fields that make up one audit row, independent of how
/// it is stored. Mirrors `AuditLog` in spec §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFields {
    pub actor_kind: String,
    pub actor_id: Option<Uuid>,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// The well-known seed hash for an entity with no prior audit events
/// (spec §4.1 step 1).
pub fn genesis_hash() -> String {
    sha256_hex(b"genesis_block_for_entity")
}

/// Build the canonical, order-fixed representation of one event's fields,
/// used both to mint a hash and to recompute one for verification.
///
/// `payload`'s own keys are included via `serde_json::Value`'s `Object`
/// variant, which this workspace never enables `preserve_order` for — so
/// its key order is always lexicographic, making this string
/// reproducible independent of the caller's insertion order.
fn canonical_fields_string(f: &AuditFields) -> String {
    let payload_json = serde_json::to_string(&f.payload).unwrap_or_else(|_| "null".to_string());
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        f.actor_kind,
        f.actor_id.map(|i| i.to_string()).unwrap_or_default(),
        f.entity_type,
        f.entity_id,
        f.action,
        f.ip.as_deref().unwrap_or(""),
        f.user_agent.as_deref().unwrap_or(""),
        payload_json,
    )
}

/// Compute `eventHash = SHA256_hex(prev || canonical_json(fields) + nowIso8601())`
/// (spec §4.1 steps 2-4). `fields.created_at` is the same instant used as
/// the `nowIso8601()` in the formula and as the persisted `createdAt`.
pub fn compute_event_hash(prev_event_hash: &str, fields: &AuditFields) -> String {
    let serialized = format!(
        "{}{}",
        canonical_fields_string(fields),
        fields.created_at.to_rfc3339()
    );
    sha256_hex(format!("{}{}", prev_event_hash, serialized).as_bytes())
}

/// One persisted row, as read back for verification. Storage-agnostic —
/// `firmante-db` maps its `DbAuditLog` into this.
#[derive(Debug, Clone)]
pub struct ChainEvent {
    pub id: Uuid,
    pub fields: AuditFields,
    pub prev_event_hash: String,
    pub event_hash: String,
}

/// Reason a chain failed to verify (spec §4.1 step 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrokenReason {
    BrokenLink,
    HashMismatch,
}

impl std::fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BrokenLink => write!(f, "Broken Link"),
            Self::HashMismatch => write!(f, "Hash Mismatch"),
        }
    }
}

/// Result of walking a chain.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyResult {
    pub is_valid: bool,
    pub count: usize,
    pub broken_event_id: Option<Uuid>,
    pub reason: Option<String>,
}

/// Walk `events` (already ordered by `createdAt` ascending, spanning
/// potentially several entityIds for a document's combined chain — see
/// `verifyChainForDocument`) and verify both link continuity and hash
/// recomputation (spec §4.1 `verifyChainForDocument`).
pub fn verify_chain(events: &[ChainEvent]) -> VerifyResult {
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            let predecessor = &events[i - 1];
            if event.prev_event_hash != predecessor.event_hash {
                return VerifyResult {
                    is_valid: false,
                    count: i,
                    broken_event_id: Some(event.id),
                    reason: Some(BrokenReason::BrokenLink.to_string()),
                };
            }
        }

        let recomputed = compute_event_hash(&event.prev_event_hash, &event.fields);
        if recomputed != event.event_hash {
            return VerifyResult {
                is_valid: false,
                count: i,
                broken_event_id: Some(event.id),
                reason: Some(BrokenReason::HashMismatch.to_string()),
            };
        }
    }

    VerifyResult {
        is_valid: true,
        count: events.len(),
        broken_event_id: None,
        reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(entity_id: Uuid, action: &str, created_at: DateTime<Utc>) -> AuditFields {
        AuditFields {
            actor_kind: "USER".to_string(),
            actor_id: Some(Uuid::new_v4()),
            entity_type: "DOCUMENT".to_string(),
            entity_id,
            action: action.to_string(),
            ip: Some("127.0.0.1".to_string()),
            user_agent: Some("test-agent".to_string()),
            payload: serde_json::json!({"fileName": "contract.pdf"}),
            created_at,
        }
    }

    fn chain_of(n: usize, entity_id: Uuid) -> Vec<ChainEvent> {
        let mut events = Vec::new();
        let mut prev = genesis_hash();
        let base = Utc::now();
        for i in 0..n {
            let f = fields(entity_id, "STORAGE_UPLOADED", base + chrono::Duration::seconds(i as i64));
            let hash = compute_event_hash(&prev, &f);
            events.push(ChainEvent {
                id: Uuid::new_v4(),
                fields: f,
                prev_event_hash: prev.clone(),
                event_hash: hash.clone(),
            });
            prev = hash;
        }
        events
    }

    #[test]
    fn test_chain_integrity() {
        let entity_id = Uuid::new_v4();
        let events = chain_of(5, entity_id);
        let result = verify_chain(&events);
        assert!(result.is_valid);
        assert_eq!(result.count, 5);
    }

    #[test]
    fn test_chain_tamper_detection() {
        let entity_id = Uuid::new_v4();
        let mut events = chain_of(3, entity_id);
        // Tamper with a middle row's payload without updating its hash,
        // mirroring scenario S2: directly mutate payloadJson.action.
        events[1].fields.action = "DOWNLOADED".to_string();

        let result = verify_chain(&events);
        assert!(!result.is_valid);
        assert_eq!(result.broken_event_id, Some(events[1].id));
        assert_eq!(result.reason.as_deref(), Some("Hash Mismatch"));
    }

    #[test]
    fn test_chain_broken_link_detection() {
        let entity_id = Uuid::new_v4();
        let mut events = chain_of(3, entity_id);
        events[2].prev_event_hash = "not-the-real-predecessor-hash".to_string();

        let result = verify_chain(&events);
        assert!(!result.is_valid);
        assert_eq!(result.broken_event_id, Some(events[2].id));
        assert_eq!(result.reason.as_deref(), Some("Broken Link"));
    }

    #[test]
    fn test_empty_chain_is_valid() {
        let result = verify_chain(&[]);
        assert!(result.is_valid);
        assert_eq!(result.count, 0);
    }

    #[test]
    fn test_genesis_hash_is_stable() {
        assert_eq!(genesis_hash(), genesis_hash());
        assert_eq!(genesis_hash().len(), 64);
    }
}
