//! # Lectern Config
//!
//! Configuration types for the Lectern session service.
//!
//! Every structure is loaded from environment variables with development
//! defaults:
//!
//! - [`jwt`]: access/refresh token secrets and lifetimes
//! - [`cookie`]: session cookie flags
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: auth endpoint rate limiting
//! - [`session`]: housekeeping sweep and listen settings
//!
//! # Example
//!
//! ```ignore
//! use lectern_config::{CookieConfig, CorsConfig, JwtConfig, RateLimitConfig, SessionConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! jwt_config.validate()?;
//! let cookie_config = CookieConfig::from_env();
//! ```

pub mod cookie;
pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod session;

// Re-export commonly used types at crate root
pub use cookie::CookieConfig;
pub use cors::CorsConfig;
pub use jwt::{ConfigError, JwtConfig};
pub use rate_limit::RateLimitConfig;
pub use session::SessionConfig;

/// Reads an environment variable and parses it, falling back to `default`
/// when the variable is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
