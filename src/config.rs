//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - dtc.toml (default configuration)
//! - dtc.local.toml (git-ignored local overrides)
//! - Environment variables (DTC_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # dtc.toml
//! [search]
//! default_quick = false
//! max_depth = 64
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! DTC_SEARCH__MAX_DEPTH=32
//! DTC_LOGGING__LEVEL=debug
//! ```

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// DAG Builder search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// `-q` is a per-invocation override; this is the default when absent.
    #[serde(default)]
    pub default_quick: bool,

    /// Recursion depth at which the search bails out with `DtcError::Oom`
    /// rather than continuing to recurse a pathologically tangled table.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Emit a line to the `dtc::dag_builder` tracing target per state the
    /// search visits (candidate count, undischarged count). Expensive on
    /// large tables; off by default.
    #[serde(default)]
    pub log_candidate_stats: bool,
}

fn default_max_depth() -> usize {
    64
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_quick: false,
            max_depth: default_max_depth(),
            log_candidate_stats: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). Overridden by `RUST_LOG`
    /// if that's set, per `tracing_subscriber::EnvFilter`'s own precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Merges in order:
    /// 1. dtc.toml (base configuration)
    /// 2. dtc.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (DTC_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("dtc.toml"))
            .merge(Toml::file("dtc.local.toml"))
            .merge(Env::prefixed("DTC_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_search_bounds() {
        let config = Config::default();
        assert!(!config.search.default_quick);
        assert_eq!(config.search.max_depth, 64);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[logging]"));
    }
}
