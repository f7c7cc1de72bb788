//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use firmante_auth::{AuthState, JwtService};
use firmante_db::Database;

use crate::notify::Notifier;
use crate::pdf::PdfStamper;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub jwt: Arc<JwtService>,
    /// Absolute-or-relative base directory for `uploads/` and
    /// `certificates/` (spec §6 filesystem layout).
    pub storage_root: Arc<std::path::PathBuf>,
    pub front_url: Arc<String>,
    pub notifier: Arc<Notifier>,
    pub pdf_stamper: Arc<dyn PdfStamper>,
}

impl FromRef<AppState> for Arc<Database> {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<JwtService> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl AuthState for AppState {
    fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    fn db(&self) -> &Database {
        &self.db
    }
}
