//! Repository implementations — one unit struct per entity. Every method
//! takes its executor as an explicit parameter (spec §9: "transactions are
//! passed as an explicit handle to every repository call") rather than the
//! repo struct holding a pool, so a caller can pass `&pool`, `&mut *tx`, or
//! anything else implementing `sqlx::PgExecutor`.

mod plan;
mod tenant;
mod user;
mod tenant_member;
mod session;
mod otp_code;
mod document;
mod folder;
mod signer;
mod share_token;
mod audit;
mod certificate;
mod tenant_settings;

pub use plan::PlanRepo;
pub use tenant::TenantRepo;
pub use user::UserRepo;
pub use tenant_member::TenantMemberRepo;
pub use session::SessionRepo;
pub use otp_code::OtpCodeRepo;
pub use document::DocumentRepo;
pub use folder::FolderRepo;
pub use signer::SignerRepo;
pub use share_token::ShareTokenRepo;
pub use audit::AuditRepo;
pub use certificate::CertificateRepo;
pub use tenant_settings::TenantSettingsRepo;
