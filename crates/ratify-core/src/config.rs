//! Typed configuration from environment variables.
//!
//! Every field has a default, so an empty environment yields a working setup.
//! The CLI calls `dotenvy::dotenv()` before `Config::from_env()` and lets its
//! flags override the result.

use std::path::PathBuf;

use crate::ports::LatencyRange;
use crate::store::DEFAULT_KEY;
use crate::workflow::TransitionGuard;

pub const TRANSITION_LATENCY_VAR: &str = "RATIFY_TRANSITION_LATENCY_MS";
pub const FAILURE_RATE_VAR: &str = "RATIFY_FAILURE_RATE";
pub const STORAGE_LATENCY_VAR: &str = "RATIFY_STORAGE_LATENCY_MS";
pub const STORAGE_KEY_VAR: &str = "RATIFY_STORAGE_KEY";
pub const DATA_DIR_VAR: &str = "RATIFY_DATA_DIR";
pub const STRICT_VAR: &str = "RATIFY_STRICT_TRANSITIONS";
pub const LOG_VAR: &str = "RATIFY_LOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub transition_latency: LatencyRange,
    /// Probability in `[0, 1]` that a transition attempt fails.
    pub failure_rate: f64,
    pub storage_latency: LatencyRange,
    pub storage_key: String,
    /// `None` keeps the collection in memory.
    pub data_dir: Option<PathBuf>,
    pub guard: TransitionGuard,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transition_latency: LatencyRange::new(500, 3000),
            failure_rate: 0.15,
            storage_latency: LatencyRange::new(100, 300),
            storage_key: DEFAULT_KEY.to_string(),
            data_dir: None,
            guard: TransitionGuard::Lenient,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`; unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(TRANSITION_LATENCY_VAR) {
            config.transition_latency = parse_latency(TRANSITION_LATENCY_VAR, value)?;
        }
        if let Some(value) = lookup(FAILURE_RATE_VAR) {
            config.failure_rate = value.trim().parse::<f64>().map_err(|e| {
                ConfigError::Invalid {
                    var: FAILURE_RATE_VAR,
                    reason: e.to_string(),
                    value,
                }
            })?;
        }
        if let Some(value) = lookup(STORAGE_LATENCY_VAR) {
            config.storage_latency = parse_latency(STORAGE_LATENCY_VAR, value)?;
        }
        if let Some(value) = lookup(STORAGE_KEY_VAR).filter(|v| !v.trim().is_empty()) {
            config.storage_key = value.trim().to_string();
        }
        if let Some(value) = lookup(DATA_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(STRICT_VAR) {
            if parse_flag(STRICT_VAR, value)? {
                config.guard = TransitionGuard::Strict;
            }
        }
        if let Some(value) = lookup(LOG_VAR).filter(|v| !v.trim().is_empty()) {
            config.log_filter = value;
        }

        Ok(config)
    }

    /// Zero latency and no simulated faults.
    pub fn instant(mut self) -> Self {
        self.transition_latency = LatencyRange::ZERO;
        self.storage_latency = LatencyRange::ZERO;
        self.failure_rate = 0.0;
        self
    }
}

fn parse_latency(var: &'static str, value: String) -> Result<LatencyRange, ConfigError> {
    value.parse().map_err(|e: crate::ports::InvalidLatencyRange| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.transition_latency, LatencyRange::new(500, 3000));
        assert_eq!(config.storage_latency, LatencyRange::new(100, 300));
        assert_eq!(config.storage_key, "ratify.tasks");
        assert_eq!(config.guard, TransitionGuard::Lenient);
    }

    #[test]
    fn variables_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            (TRANSITION_LATENCY_VAR, "10..20"),
            (FAILURE_RATE_VAR, "0.5"),
            (STORAGE_LATENCY_VAR, "0"),
            (STORAGE_KEY_VAR, "board"),
            (DATA_DIR_VAR, "/tmp/ratify"),
            (STRICT_VAR, "true"),
            (LOG_VAR, "ratify_core=debug"),
        ]))
        .unwrap();

        assert_eq!(config.transition_latency, LatencyRange::new(10, 20));
        assert_eq!(config.failure_rate, 0.5);
        assert_eq!(config.storage_latency, LatencyRange::ZERO);
        assert_eq!(config.storage_key, "board");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/ratify")));
        assert_eq!(config.guard, TransitionGuard::Strict);
        assert_eq!(config.log_filter, "ratify_core=debug");
    }

    #[rstest]
    #[case(FAILURE_RATE_VAR, "often")]
    #[case(TRANSITION_LATENCY_VAR, "3000..500")]
    #[case(STORAGE_LATENCY_VAR, "fast")]
    #[case(STRICT_VAR, "maybe")]
    fn malformed_values_are_rejected(#[case] var: &'static str, #[case] value: &str) {
        let err = Config::from_lookup(lookup(&[(var, value)])).unwrap_err();
        assert!(err.to_string().contains(var));
    }

    #[test]
    fn instant_disables_latency_and_faults() {
        let config = Config::default().instant();
        assert_eq!(config.transition_latency, LatencyRange::ZERO);
        assert_eq!(config.failure_rate, 0.0);
    }
}
