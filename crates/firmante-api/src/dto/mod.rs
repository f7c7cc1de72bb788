//! Data Transfer Objects
//!
//! Request and response structures for the HTTP surface.

pub mod auth;
pub mod common;
pub mod document;
pub mod signer;
pub mod tenant;

pub use auth::*;
pub use common::*;
pub use document::*;
pub use signer::*;
pub use tenant::*;
