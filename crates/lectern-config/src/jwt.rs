//! Token signing configuration.
//!
//! Access and refresh tokens are signed with independent secrets and carry
//! independent lifetimes. A token of one class must never verify as the
//! other, so [`JwtConfig::validate`] refuses a configuration where the two
//! secrets coincide.
//!
//! # Environment Variables
//!
//! - `JWT_ACCESS_SECRET`: HMAC secret for access tokens
//! - `JWT_REFRESH_SECRET`: HMAC secret for refresh tokens
//! - `JWT_ACCESS_EXPIRY`: access token lifetime in seconds (default: 900)
//! - `JWT_REFRESH_EXPIRY`: refresh token lifetime in seconds (default: 604800)

use std::env;

use crate::env_or;

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_EXPIRY: i64 = 15 * 60;
/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_EXPIRY: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptySecret(&'static str),

    #[error("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ")]
    SharedSecret,

    #[error("{0} must be a positive number of seconds")]
    NonPositiveExpiry(&'static str),

    #[error("{0} must be greater than zero")]
    ZeroRateLimit(&'static str),
}

#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var("JWT_ACCESS_SECRET")
                .unwrap_or_else(|_| "dev-access-secret-change-in-production".to_string()),
            refresh_secret: env::var("JWT_REFRESH_SECRET")
                .unwrap_or_else(|_| "dev-refresh-secret-change-in-production".to_string()),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_EXPIRY),
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRY", DEFAULT_REFRESH_EXPIRY),
        }
    }

    /// Checks the invariants the token codec relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() {
            return Err(ConfigError::EmptySecret("JWT_ACCESS_SECRET"));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::EmptySecret("JWT_REFRESH_SECRET"));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::NonPositiveExpiry("JWT_ACCESS_EXPIRY"));
        }
        if self.refresh_token_expiry <= 0 {
            return Err(ConfigError::NonPositiveExpiry("JWT_REFRESH_EXPIRY"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret-at-least-32-characters-long".to_string(),
            refresh_secret: "refresh-secret-at-least-32-characters-long".to_string(),
            access_token_expiry: DEFAULT_ACCESS_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_EXPIRY,
        }
    }

    #[test]
    fn test_defaults_match_token_lifetimes() {
        assert_eq!(DEFAULT_ACCESS_EXPIRY, 900);
        assert_eq!(DEFAULT_REFRESH_EXPIRY, 604_800);
    }

    #[test]
    fn test_validate_accepts_distinct_secrets() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_shared_secret() {
        let mut config = config();
        config.refresh_secret = config.access_secret.clone();
        assert_eq!(config.validate(), Err(ConfigError::SharedSecret));
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = config();
        config.access_secret.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptySecret("JWT_ACCESS_SECRET"))
        );
    }

    #[test]
    fn test_validate_rejects_zero_expiry() {
        let mut config = config();
        config.refresh_token_expiry = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositiveExpiry("JWT_REFRESH_EXPIRY"))
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug_str = format!("{:?}", config());
        assert!(debug_str.contains("JwtConfig"));
        assert!(!debug_str.contains("access-secret"));
    }
}
