//! API Handlers
//!
//! Request handlers for all API endpoints.
//! Each module handles a specific domain.

pub mod auth;
pub mod document;
pub mod health;
pub mod signer;
pub mod tenant;

pub use health::*;
