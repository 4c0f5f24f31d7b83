//! Configuration Module
//!
//! Handles cache configuration: the namespace policy table and the
//! background sweep cadence.

use std::env;

use crate::cache::PolicyTable;

/// Cache configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace TTL/capacity policies, fixed for the store's lifetime
    pub policies: PolicyTable,
    /// Background sweep task interval in seconds
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Creates a new Config from environment variables, falling back to the
    /// default dashboard policy table.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            policies: PolicyTable::default(),
            sweep_interval_secs: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policies: PolicyTable::default(),
            sweep_interval_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.sweep_interval_secs, 30);
        assert_eq!(config.policies.default_policy().ttl_ms, 300_000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("SWEEP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.sweep_interval_secs, 30);
        assert!(!config.policies.policies().is_empty());
    }
}
