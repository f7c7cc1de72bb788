//! Firmante Types - shared error taxonomy for the document-signing backend
//!
//! This crate contains the foundational `FirmanteError` type, with zero
//! dependencies on other firmante crates. It exists so that every layer —
//! crypto, db, auth, api — can raise and match on the same error categories
//! (spec §7) without a dependency cycle.

pub mod error;

pub use error::*;

/// Status enums shared by more than one entity in the data model (spec §3).
pub mod status {
    /// `Tenant.status`
    pub const TENANT_ACTIVE: &str = "ACTIVE";
    pub const TENANT_INACTIVE: &str = "INACTIVE";
    pub const TENANT_SUSPENDED: &str = "SUSPENDED";

    /// `Tenant.subscriptionStatus`
    pub const SUB_PENDING: &str = "PENDING";
    pub const SUB_ACTIVE: &str = "ACTIVE";
    pub const SUB_OVERDUE: &str = "OVERDUE";
    pub const SUB_CANCELED: &str = "CANCELED";

    /// `User.role` / active role on the request principal
    pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";
    pub const ROLE_ADMIN: &str = "ADMIN";
    pub const ROLE_MANAGER: &str = "MANAGER";
    pub const ROLE_VIEWER: &str = "VIEWER";
    pub const ROLE_USER: &str = "USER";

    /// `User.status`
    pub const USER_ACTIVE: &str = "ACTIVE";
    pub const USER_BLOCKED: &str = "BLOCKED";

    /// `TenantMember.status`
    pub const MEMBER_PENDING: &str = "PENDING";
    pub const MEMBER_ACTIVE: &str = "ACTIVE";
    pub const MEMBER_DECLINED: &str = "DECLINED";

    /// `Document.status`
    pub const DOC_DRAFT: &str = "DRAFT";
    pub const DOC_READY: &str = "READY";
    pub const DOC_PARTIALLY_SIGNED: &str = "PARTIALLY_SIGNED";
    pub const DOC_SIGNED: &str = "SIGNED";
    pub const DOC_EXPIRED: &str = "EXPIRED";
    pub const DOC_CANCELLED: &str = "CANCELLED";

    /// `Signer.status`
    pub const SIGNER_PENDING: &str = "PENDING";
    pub const SIGNER_VIEWED: &str = "VIEWED";
    pub const SIGNER_SIGNED: &str = "SIGNED";
    pub const SIGNER_DECLINED: &str = "DECLINED";
    pub const SIGNER_EXPIRED: &str = "EXPIRED";

    /// `OtpCode.channel`
    pub const CHANNEL_EMAIL: &str = "EMAIL";
    pub const CHANNEL_SMS: &str = "SMS";
    pub const CHANNEL_WHATSAPP: &str = "WHATSAPP";

    /// `OtpCode.context`
    pub const CTX_LOGIN: &str = "LOGIN";
    pub const CTX_SIGNING: &str = "SIGNING";
    pub const CTX_PASSWORD_RESET: &str = "PASSWORD_RESET";

    /// `AuditLog.actorKind`
    pub const ACTOR_USER: &str = "USER";
    pub const ACTOR_SIGNER: &str = "SIGNER";
    pub const ACTOR_SYSTEM: &str = "SYSTEM";

    /// `AuditLog.entityType`
    pub const ENTITY_DOCUMENT: &str = "DOCUMENT";
    pub const ENTITY_SIGNER: &str = "SIGNER";
    pub const ENTITY_TOKEN: &str = "TOKEN";
    pub const ENTITY_OTP: &str = "OTP";
    pub const ENTITY_STORAGE: &str = "STORAGE";
    pub const ENTITY_SYSTEM: &str = "SYSTEM";
    pub const ENTITY_USER: &str = "USER";
    pub const ENTITY_TENANT: &str = "TENANT";
}
