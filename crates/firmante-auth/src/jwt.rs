//! JWT minting and verification (spec §4.3).
//!
//! Two credential kinds only: a short-lived access token and a long-lived
//! refresh token. Refresh revocation is DB-backed (see `firmante_db::Session`)
//! rather than an in-process revocation set, so it survives multiple workers.
//! A refresh credential is invalidated by deleting its `Session` row
//! ([`crate::service::IdentityService::refresh`]), not by tracking a jti
//! blocklist. Access credentials are never revoked early — they simply
//! expire within their short lifetime.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use firmante_types::{FirmanteError, Result as FirmanteResult};

use crate::config::JwtConfig;
use crate::error::jwt_error;
use crate::types::{AccessClaims, RefreshClaims, TokenPair};

#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let access_encoding = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding = DecodingKey::from_secret(config.refresh_secret.as_bytes());
        Self {
            config,
            access_encoding,
            access_decoding,
            refresh_encoding,
            refresh_decoding,
        }
    }

    /// Mint an access+refresh pair embedding the active `{tenantId, role}`
    /// (spec §4.3). `role` is omitted from the refresh credential by design.
    pub fn mint_pair(&self, user_id: Uuid, tenant_id: Uuid, role: &str) -> FirmanteResult<TokenPair> {
        let now = Utc::now();
        let access_exp = now
            + Duration::from_std(self.config.access_token_lifetime)
                .map_err(|e| FirmanteError::internal(e.to_string()))?;
        let refresh_exp = now
            + Duration::from_std(self.config.refresh_token_lifetime)
                .map_err(|e| FirmanteError::internal(e.to_string()))?;

        let access_claims = AccessClaims {
            sub: user_id,
            tenant_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            iss: self.config.issuer.clone(),
        };
        let access_token = encode(&Header::default(), &access_claims, &self.access_encoding)
            .map_err(jwt_error)?;

        let refresh_claims = RefreshClaims {
            sub: user_id,
            tenant_id,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            iss: self.config.issuer.clone(),
        };
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_encoding)
            .map_err(jwt_error)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access_exp,
            refresh_expires_at: refresh_exp,
        })
    }

    pub fn verify_access(&self, token: &str) -> FirmanteResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_exp = true;
        decode::<AccessClaims>(token, &self.access_decoding, &validation)
            .map(|d| d.claims)
            .map_err(jwt_error)
    }

    pub fn verify_refresh(&self, token: &str) -> FirmanteResult<RefreshClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_exp = true;
        decode::<RefreshClaims>(token, &self.refresh_decoding, &validation)
            .map(|d| d.claims)
            .map_err(jwt_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret-at-least-32-bytes-long!!".to_string(),
            refresh_secret: "refresh-secret-at-least-32-bytes-long!".to_string(),
            access_token_lifetime: std::time::Duration::from_secs(900),
            refresh_token_lifetime: std::time::Duration::from_secs(604_800),
            issuer: "firmante-test".to_string(),
        }
    }

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let jwt = JwtService::new(test_config());
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let pair = jwt.mint_pair(user_id, tenant_id, "ADMIN").unwrap();

        let access = jwt.verify_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, user_id);
        assert_eq!(access.tenant_id, tenant_id);
        assert_eq!(access.role, "ADMIN");

        let refresh = jwt.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, user_id);
        assert_eq!(refresh.tenant_id, tenant_id);
    }

    #[test]
    fn test_access_token_rejected_by_refresh_secret() {
        let jwt = JwtService::new(test_config());
        let pair = jwt.mint_pair(Uuid::new_v4(), Uuid::new_v4(), "ADMIN").unwrap();
        assert!(jwt.verify_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let jwt = JwtService::new(test_config());
        assert!(jwt.verify_access("not-a-token").is_err());
    }
}
