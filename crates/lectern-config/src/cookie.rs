//! Session cookie configuration.
//!
//! Both session cookies are HttpOnly and `SameSite=Lax`. The `Secure` flag
//! is only set in production so local development over plain HTTP works.

use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieConfig {
    /// Emit the `Secure` attribute.
    pub secure: bool,
    /// Cookie path, `/` unless the API is mounted elsewhere.
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: false,
            path: "/".to_string(),
        }
    }
}

impl CookieConfig {
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Self {
            secure: is_production(&environment),
            path: env::var("COOKIE_PATH").unwrap_or_else(|_| "/".to_string()),
        }
    }
}

fn is_production(environment: &str) -> bool {
    matches!(environment.to_lowercase().as_str(), "production" | "prod")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_detection() {
        assert!(is_production("production"));
        assert!(is_production("PROD"));
        assert!(!is_production("development"));
        assert!(!is_production("staging"));
    }

    #[test]
    fn test_default_is_insecure_root_path() {
        let config = CookieConfig::default();
        assert!(!config.secure);
        assert_eq!(config.path, "/");
    }
}
