//! # Grocery List Configuration Module
//!
//! This module defines configuration structures for grocery-list generation,
//! including the consolidation service connection, recovery settings and
//! diagnostic thresholds.
//!
//! Values come from the environment (a `.env` file is loaded first when
//! present). Unset or unparseable values fall back to the defaults below.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

// Constants for grocery list configuration
pub const DEFAULT_OVER_CONSOLIDATION_THRESHOLD: usize = 5;
pub const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_SERVICE_MODEL: &str = "gpt-4o-mini";

/// Recovery configuration for the consolidation service
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryConfig {
    /// Consecutive failures before the service is skipped
    pub circuit_breaker_threshold: u32,
    /// Seconds the service stays skipped before it is tried again
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Connection settings for the natural-language consolidation service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Whether the service path is attempted at all
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`
    pub base_url: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    /// Upper bound on one service call, connection included
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            model: DEFAULT_SERVICE_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_SERVICE_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether the service can be called: enabled and pointed at a URL
    pub fn is_usable(&self) -> bool {
        self.enabled && self.base_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }
}

/// Configuration structure for grocery list generation
#[derive(Debug, Clone, PartialEq)]
pub struct GroceryConfig {
    /// Contributing lines above which an item is reported as over-consolidated
    pub over_consolidation_threshold: usize,
    pub service: ServiceConfig,
    pub recovery: RecoveryConfig,
}

impl Default for GroceryConfig {
    fn default() -> Self {
        Self {
            over_consolidation_threshold: DEFAULT_OVER_CONSOLIDATION_THRESHOLD,
            service: ServiceConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl GroceryConfig {
    /// Load configuration from the process environment
    ///
    /// | variable | default |
    /// |---|---|
    /// | `GROCERY_OVER_CONSOLIDATION_THRESHOLD` | 5 |
    /// | `GROCERY_SERVICE_URL` | unset (service disabled) |
    /// | `GROCERY_SERVICE_ENABLED` | `true` when a URL is set |
    /// | `GROCERY_SERVICE_MODEL` | `gpt-4o-mini` |
    /// | `GROCERY_SERVICE_API_KEY` | unset |
    /// | `GROCERY_SERVICE_TIMEOUT_SECS` | 20 |
    /// | `GROCERY_CIRCUIT_BREAKER_THRESHOLD` | 5 |
    /// | `GROCERY_CIRCUIT_BREAKER_RESET_SECS` | 60 |
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let base_url = lookup("GROCERY_SERVICE_URL").filter(|url| !url.trim().is_empty());

        let service = ServiceConfig {
            enabled: parsed_or(&lookup, "GROCERY_SERVICE_ENABLED", base_url.is_some()),
            base_url,
            model: lookup("GROCERY_SERVICE_MODEL")
                .filter(|model| !model.trim().is_empty())
                .unwrap_or(defaults.service.model),
            api_key: lookup("GROCERY_SERVICE_API_KEY").filter(|key| !key.trim().is_empty()),
            timeout_secs: parsed_or(
                &lookup,
                "GROCERY_SERVICE_TIMEOUT_SECS",
                defaults.service.timeout_secs,
            ),
        };

        let recovery = RecoveryConfig {
            circuit_breaker_threshold: parsed_or(
                &lookup,
                "GROCERY_CIRCUIT_BREAKER_THRESHOLD",
                defaults.recovery.circuit_breaker_threshold,
            ),
            circuit_breaker_reset_secs: parsed_or(
                &lookup,
                "GROCERY_CIRCUIT_BREAKER_RESET_SECS",
                defaults.recovery.circuit_breaker_reset_secs,
            ),
        };

        Self {
            over_consolidation_threshold: parsed_or(
                &lookup,
                "GROCERY_OVER_CONSOLIDATION_THRESHOLD",
                defaults.over_consolidation_threshold,
            ),
            service,
            recovery,
        }
    }
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(variable = key, value = %raw, default = ?default, "Invalid configuration value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> GroceryConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GroceryConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = GroceryConfig::default();
        assert_eq!(config.over_consolidation_threshold, 5);
        assert_eq!(config.service.timeout_secs, 20);
        assert!(!config.service.is_usable());
        assert_eq!(config.recovery.circuit_breaker_threshold, 5);
        assert_eq!(config.recovery.circuit_breaker_reset_secs, 60);
    }

    #[test]
    fn test_empty_environment_matches_defaults() {
        assert_eq!(config_from(&[]), GroceryConfig::default());
    }

    #[test]
    fn test_url_enables_service() {
        let config = config_from(&[
            ("GROCERY_SERVICE_URL", "http://localhost:8080/v1"),
            ("GROCERY_SERVICE_MODEL", "llama3"),
            ("GROCERY_SERVICE_TIMEOUT_SECS", "5"),
        ]);

        assert!(config.service.is_usable());
        assert_eq!(config.service.model, "llama3");
        assert_eq!(config.service.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_service_can_be_disabled_explicitly() {
        let config = config_from(&[
            ("GROCERY_SERVICE_URL", "http://localhost:8080/v1"),
            ("GROCERY_SERVICE_ENABLED", "false"),
        ]);
        assert!(!config.service.is_usable());
    }

    #[test]
    fn test_enabled_without_url_is_unusable() {
        let config = config_from(&[("GROCERY_SERVICE_ENABLED", "true")]);
        assert!(config.service.enabled);
        assert!(!config.service.is_usable());
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = config_from(&[
            ("GROCERY_OVER_CONSOLIDATION_THRESHOLD", "many"),
            ("GROCERY_SERVICE_TIMEOUT_SECS", "-3"),
            ("GROCERY_CIRCUIT_BREAKER_THRESHOLD", "2"),
        ]);

        assert_eq!(config.over_consolidation_threshold, 5);
        assert_eq!(config.service.timeout_secs, 20);
        assert_eq!(config.recovery.circuit_breaker_threshold, 2);
    }
}
