//! Reminder Scheduler hook (spec §4.10, C10).
//!
//! These are the two operations an external cron/scheduler process is
//! expected to invoke periodically. Firmante's own core never calls
//! these on its own — there is no in-process scheduler loop (spec §5
//! "no per-process in-memory state").

use colored::*;
use firmante_api::notify::{Notifier, ProcessWideCredentials};
use firmante_db::{AuditRepo, Database, DocumentRepo};
use firmante_types::status;

/// `dueReminders(now)`: documents within 24h of their deadline, still open,
/// with auto-reminders on. Sends a best-effort reminder email to the
/// document owner for each one found.
pub async fn due_reminders(db: &Database, send: bool) -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    let docs = DocumentRepo::find_due_reminders(&db.pg, now).await?;

    println!("{} {} document(s) due for a reminder", "→".bright_cyan(), docs.len());

    if !send {
        for doc in &docs {
            println!("  {} {} (deadline {})", doc.id, doc.title, doc.deadline_at.map(|d| d.to_rfc3339()).unwrap_or_default());
        }
        return Ok(());
    }

    let notifier = Notifier::new(ProcessWideCredentials {
        resend_api_key: std::env::var("RESEND_API_KEY").ok(),
        zapi_instance_id: std::env::var("ZAPI_INSTANCE_ID").ok(),
        zapi_token: std::env::var("ZAPI_TOKEN").ok(),
        zapi_client_token: std::env::var("ZAPI_CLIENT_TOKEN").ok(),
    });

    for doc in &docs {
        let owner = firmante_db::UserRepo::find_by_id(&db.pg, doc.owner_id).await?;
        let subject = format!("Lembrete: {} aguarda assinatura", doc.title);
        let body = format!("O documento \"{}\" está próximo do prazo e ainda não foi totalmente assinado.", doc.title);
        notifier.send_email(db, doc.tenant_id, &owner.email, &subject, &body).await;
        println!("  {} reminder sent for {}", "✓".bright_green(), doc.title);
    }

    Ok(())
}

/// `expireOverdue(now)`: transitions every past-deadline READY/PARTIALLY_SIGNED
/// document to EXPIRED, appending a STATUS_CHANGED audit per transition
/// with actorKind=SYSTEM.
pub async fn expire_overdue(db: &Database) -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    let docs = DocumentRepo::find_overdue(&db.pg, now).await?;

    println!("{} {} document(s) overdue", "→".bright_cyan(), docs.len());

    for doc in &docs {
        let mut tx = db.begin().await?;
        DocumentRepo::update_status(&mut *tx, doc.id, status::DOC_EXPIRED).await?;
        AuditRepo::append(
            &mut tx,
            doc.tenant_id,
            status::ACTOR_SYSTEM,
            None,
            status::ENTITY_DOCUMENT,
            doc.id,
            "STATUS_CHANGED",
            None,
            None,
            serde_json::json!({ "newStatus": status::DOC_EXPIRED }),
        )
        .await?;
        tx.commit().await.map_err(firmante_db::DbError::Query)?;
        println!("  {} expired {}", "✓".yellow(), doc.title);
    }

    Ok(())
}
