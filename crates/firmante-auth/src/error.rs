//! This crate raises the shared [`firmante_types::FirmanteError`] taxonomy
//! (spec §7) rather than a parallel auth-specific enum — every layer of the
//! backend matches on the same categories. This module only adds the
//! conversions `firmante_types` can't provide itself (orphan rule forbids
//! `impl From<jsonwebtoken::errors::Error> for FirmanteError` anywhere but
//! here or in `firmante_types`, and `firmante_types` has no JWT dependency).

use firmante_types::FirmanteError;

pub fn jwt_error(e: jsonwebtoken::errors::Error) -> FirmanteError {
    use jsonwebtoken::errors::ErrorKind;
    match e.kind() {
        ErrorKind::ExpiredSignature => FirmanteError::Expired("credential expired".to_string()),
        _ => FirmanteError::Unauthenticated(format!("invalid credential: {}", e)),
    }
}
