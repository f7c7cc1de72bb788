//! Firmante Identity, Session & Authorization Layer
//!
//! Covers spec components C3 (Identity & Session), C4 (Tenant &
//! Membership), C5 (Authorization), and C6 (Quota & Subscription Gate) —
//! grouped here because all four sit directly in front of the document
//! domain and share the same `Principal`/JWT plumbing.
//!
//! # Architecture
//!
//! ```text
//! Bearer token → Principal extractor (authenticate, C5) → handler
//!                         │
//!             IdentityService / TenantService (C3, C4)
//!                         │
//!                    firmante-db repos
//! ```

pub mod authz;
pub mod config;
pub mod error;
pub mod jwt;
pub mod membership;
pub mod quota;
pub mod service;
pub mod types;

pub use authz::{require_role, require_super_admin, role_allows, AuthState};
pub use config::{AuthConfig, JwtConfig};
pub use jwt::JwtService;
pub use membership::TenantMembershipService;
pub use service::{IdentityService, LoginOutput, RegisterInput, RegisterOutput};
pub use types::{AccessClaims, Principal, RefreshClaims, TokenPair};
