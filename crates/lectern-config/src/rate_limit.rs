//! Rate limiting configuration for the authentication endpoints.
//!
//! Login and refresh are the two endpoints an attacker can hammer without a
//! valid session, so they sit behind a per-client token bucket.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: set to `false` to disable (default: true)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: token replenishment interval in seconds (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: burst size for auth endpoints (default: 5)
//!
//! # Example
//!
//! ```ignore
//! use lectern_config::RateLimitConfig;
//!
//! let config = RateLimitConfig::from_env();
//! let auth_router = Router::new()
//!     .route("/login", post(login))
//!     .layer(GovernorLayer::new(Arc::new(config.auth_governor_config())));
//! ```

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::{ConfigError, env_or};

/// Rate limit configuration for the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,

    /// Seconds between token replenishments.
    pub auth_per_second: u64,

    /// Maximum tokens that can accumulate for one client.
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    /// Creates a `RateLimitConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set
    /// or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// A configuration with rate limiting switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Rejects a zero period or burst size while rate limiting is enabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.auth_per_second == 0 {
            return Err(ConfigError::ZeroRateLimit("RATE_LIMIT_AUTH_PER_SECOND"));
        }
        if self.auth_burst_size == 0 {
            return Err(ConfigError::ZeroRateLimit("RATE_LIMIT_AUTH_BURST_SIZE"));
        }
        Ok(())
    }

    /// Creates a `GovernorConfig` for authentication endpoints.
    ///
    /// Clients are keyed by `X-Forwarded-For` / `X-Real-IP` / `Forwarded`,
    /// falling back to the peer address.
    ///
    /// # Panics
    ///
    /// Panics if the burst size or period is zero. [`RateLimitConfig::validate`]
    /// catches that at startup.
    #[must_use]
    pub fn auth_governor_config(
        &self,
    ) -> GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware> {
        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second)
            .burst_size(self.auth_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("Failed to build auth rate limiter config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.auth_per_second, 10);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_disabled_config() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_validate_rejects_zero_burst() {
        let config = RateLimitConfig {
            auth_burst_size: 0,
            ..RateLimitConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroRateLimit("RATE_LIMIT_AUTH_BURST_SIZE"))
        );
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let config = RateLimitConfig {
            auth_per_second: 0,
            ..RateLimitConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroRateLimit("RATE_LIMIT_AUTH_PER_SECOND"))
        );
    }

    #[test]
    fn test_validate_ignores_zero_values_when_disabled() {
        let config = RateLimitConfig {
            auth_burst_size: 0,
            ..RateLimitConfig::disabled()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(RateLimitConfig::default().validate(), Ok(()));
    }
}
