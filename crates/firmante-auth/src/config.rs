//! Authentication configuration
//!
//! Dual-secret JWT config: access and refresh credentials are signed with
//! different secrets (deviation from a single shared secret — see
//! DESIGN.md) so that leaking one does not also forge the other.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_lifetime: Duration,
    pub refresh_token_lifetime: Duration,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_token_lifetime: Duration::from_secs(30 * 60),
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 60 * 60),
            issuer: "firmante".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
}

impl AuthConfig {
    /// Reads `JWT_SECRET`, `JWT_REFRESH_SECRET`, and optional
    /// `JWT_ACCESS_TTL_SECS` / `JWT_REFRESH_TTL_SECS` / `JWT_ISSUER`.
    pub fn from_env() -> Result<Self, String> {
        let access_secret = std::env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;
        let refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .map_err(|_| "JWT_REFRESH_SECRET must be set".to_string())?;

        let mut jwt = JwtConfig {
            access_secret,
            refresh_secret,
            ..Default::default()
        };

        if let Ok(s) = std::env::var("JWT_ACCESS_TTL_SECS") {
            jwt.access_token_lifetime = Duration::from_secs(
                s.parse().map_err(|_| "JWT_ACCESS_TTL_SECS must be an integer".to_string())?,
            );
        }
        if let Ok(s) = std::env::var("JWT_REFRESH_TTL_SECS") {
            jwt.refresh_token_lifetime = Duration::from_secs(
                s.parse().map_err(|_| "JWT_REFRESH_TTL_SECS must be an integer".to_string())?,
            );
        }
        if let Ok(iss) = std::env::var("JWT_ISSUER") {
            jwt.issuer = iss;
        }

        let config = Self { jwt };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.access_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 bytes".to_string());
        }
        if self.jwt.refresh_secret.len() < 32 {
            return Err("JWT_REFRESH_SECRET must be at least 32 bytes".to_string());
        }
        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err("JWT_SECRET and JWT_REFRESH_SECRET must differ".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_secret() {
        let config = AuthConfig {
            jwt: JwtConfig {
                access_secret: "too-short".to_string(),
                refresh_secret: "also-too-short-but-different".to_string(),
                ..Default::default()
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_identical_secrets() {
        let secret = "a".repeat(32);
        let config = AuthConfig {
            jwt: JwtConfig {
                access_secret: secret.clone(),
                refresh_secret: secret,
                ..Default::default()
            },
        };
        assert!(config.validate().is_err());
    }
}
