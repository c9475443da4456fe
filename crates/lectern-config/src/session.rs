//! Server and housekeeping settings.
//!
//! - `PORT`: HTTP listen port (default: 3000)
//! - `SESSION_SWEEP_INTERVAL_SECS`: how often revoked and expired refresh
//!   token records are deleted (default: 3600, `0` disables the sweep)

use std::time::Duration;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub port: u16,
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            sweep_interval_secs: 3600,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            sweep_interval_secs: env_or("SESSION_SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs),
        }
    }

    /// `None` when the sweep is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_interval() {
        let config = SessionConfig::default();
        assert_eq!(config.sweep_interval(), Some(Duration::from_secs(3600)));

        let disabled = SessionConfig {
            sweep_interval_secs: 0,
            ..SessionConfig::default()
        };
        assert_eq!(disabled.sweep_interval(), None);
    }
}
