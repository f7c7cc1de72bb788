//! Notification adapter (spec §4.11, C11).
//!
//! `sendEmail`/`sendWhatsAppText` are the only shapes the core calls.
//! Credential resolution checks `TenantSettings` per tenant first, falling
//! back to process-wide credentials; delivery is fire-and-forget from the
//! caller's point of view — every error here is logged, never surfaced as
//! a transaction failure (spec §5 "Suspension points"). Delivery is a plain
//! `reqwest` POST per provider with a short timeout; errors are logged and
//! swallowed rather than propagated.

use std::time::Duration;

use uuid::Uuid;

use firmante_db::{Database, TenantSettingsRepo};

const HTTP_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Default)]
pub struct ProcessWideCredentials {
    pub resend_api_key: Option<String>,
    pub zapi_instance_id: Option<String>,
    pub zapi_token: Option<String>,
    pub zapi_client_token: Option<String>,
}

pub struct Notifier {
    http: reqwest::Client,
    fallback: ProcessWideCredentials,
}

struct EmailCreds {
    api_key: String,
}

struct WhatsAppCreds {
    instance_id: String,
    token: String,
    client_token: String,
}

impl Notifier {
    pub fn new(fallback: ProcessWideCredentials) -> Self {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build().unwrap_or_default();
        Self { http, fallback }
    }

    /// `sendEmail(tenantId, {to, subject, html})` via Resend.
    pub async fn send_email(&self, db: &Database, tenant_id: Uuid, to: &str, subject: &str, html: &str) {
        let creds = match self.resolve_email_creds(db, tenant_id).await {
            Some(c) => c,
            None => {
                tracing::warn!(%tenant_id, "no email credentials configured, dropping notification");
                return;
            }
        };

        let body = serde_json::json!({
            "from": "Firmante <notificacoes@firmante.com.br>",
            "to": [to],
            "subject": subject,
            "html": html,
        });

        let result = self
            .http
            .post("https://api.resend.com/emails")
            .bearer_auth(&creds.api_key)
            .json(&body)
            .send()
            .await;

        if let Err(e) = result {
            tracing::warn!(%tenant_id, error = %e, "email delivery failed");
        }
    }

    /// `sendWhatsAppText(tenantId, {phone, message})` via Z-API.
    pub async fn send_whatsapp_text(&self, db: &Database, tenant_id: Uuid, phone: &str, message: &str) {
        let creds = match self.resolve_whatsapp_creds(db, tenant_id).await {
            Some(c) => c,
            None => {
                tracing::warn!(%tenant_id, "no whatsapp credentials configured, dropping notification");
                return;
            }
        };

        let url = format!(
            "https://api.z-api.io/instances/{}/token/{}/send-text",
            creds.instance_id, creds.token
        );
        let phone = normalize_phone_e164(phone);
        let body = serde_json::json!({ "phone": phone, "message": message });

        let result = self
            .http
            .post(&url)
            .header("Client-Token", creds.client_token)
            .json(&body)
            .send()
            .await;

        if let Err(e) = result {
            tracing::warn!(%tenant_id, error = %e, "whatsapp delivery failed");
        }
    }

    async fn resolve_email_creds(&self, db: &Database, tenant_id: Uuid) -> Option<EmailCreds> {
        if let Ok(Some(settings)) = TenantSettingsRepo::find_by_tenant(&db.pg, tenant_id).await {
            if settings.resend_active {
                if let Some(key) = settings.resend_api_key {
                    return Some(EmailCreds { api_key: key });
                }
            }
        }
        self.fallback.resend_api_key.clone().map(|api_key| EmailCreds { api_key })
    }

    async fn resolve_whatsapp_creds(&self, db: &Database, tenant_id: Uuid) -> Option<WhatsAppCreds> {
        if let Ok(Some(settings)) = TenantSettingsRepo::find_by_tenant(&db.pg, tenant_id).await {
            if settings.zapi_active {
                if let (Some(instance_id), Some(token), Some(client_token)) =
                    (settings.zapi_instance_id, settings.zapi_token, settings.zapi_client_token)
                {
                    return Some(WhatsAppCreds { instance_id, token, client_token });
                }
            }
        }
        let f = &self.fallback;
        match (&f.zapi_instance_id, &f.zapi_token, &f.zapi_client_token) {
            (Some(i), Some(t), Some(c)) => {
                Some(WhatsAppCreds { instance_id: i.clone(), token: t.clone(), client_token: c.clone() })
            }
            _ => None,
        }
    }
}

/// Strip non-digits; prepend `55` for a bare 10/11-digit national number;
/// assume already prefixed otherwise (spec §4.11).
pub fn normalize_phone_e164(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 || digits.len() == 11 {
        format!("55{}", digits)
    } else {
        digits
    }
}

/// Completion-email template substitution (spec §4.11): literal,
/// case-sensitive tokens, global string-replace.
pub fn render_template(template: &str, signer_name: &str, doc_title: &str, doc_link: &str, doc_id: Uuid) -> String {
    template
        .replace("{{signer_name}}", signer_name)
        .replace("{{doc_title}}", doc_title)
        .replace("{{doc_link}}", doc_link)
        .replace("{{doc_id}}", &doc_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_prepends_55_for_bare_national_number() {
        assert_eq!(normalize_phone_e164("(11) 98888-7777"), "5511988887777");
        assert_eq!(normalize_phone_e164("11 8888-7777"), "551188887777");
    }

    #[test]
    fn test_normalize_phone_leaves_already_prefixed_alone() {
        assert_eq!(normalize_phone_e164("+55 11 98888-7777"), "5511988887777");
    }

    #[test]
    fn test_render_template_substitutes_all_tokens() {
        let id = Uuid::nil();
        let out = render_template(
            "Oi {{signer_name}}, {{doc_title}} ({{doc_id}}): {{doc_link}}",
            "Maria",
            "Contrato",
            "https://app/x",
            id,
        );
        assert_eq!(out, format!("Oi Maria, Contrato ({}): https://app/x", id));
    }
}
