//! Runtime settings, read from the environment.
//!
//! | Variable                          | Default | Meaning                         |
//! |-----------------------------------|---------|---------------------------------|
//! | `PROJECT_DEPS_CATALOG`            | unset   | JSON package catalog path       |
//! | `PROJECT_DEPS_FETCH_CONCURRENCY`  | 8       | concurrent metadata fetches     |
//! | `PROJECT_DEPS_LOG`                | `warn`  | `env_logger` filter             |
//!
//! Command-line flags override these.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const CATALOG_VAR: &str = "PROJECT_DEPS_CATALOG";
pub const FETCH_CONCURRENCY_VAR: &str = "PROJECT_DEPS_FETCH_CONCURRENCY";
pub const LOG_VAR: &str = "PROJECT_DEPS_LOG";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub catalog: Option<PathBuf>,
    pub fetch_concurrency: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            fetch_concurrency: 8,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(path) = get(CATALOG_VAR) {
            config.catalog = Some(PathBuf::from(path));
        }
        if let Some(raw) = get(FETCH_CONCURRENCY_VAR) {
            config.fetch_concurrency = parse_concurrency(&raw)?;
        }
        if let Some(filter) = get(LOG_VAR) {
            config.log_filter = filter;
        }
        Ok(config)
    }
}

pub fn parse_concurrency(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: FETCH_CONCURRENCY_VAR,
            value: raw.to_string(),
            reason: "must be at least 1",
        }),
        Ok(n) => Ok(n),
        Err(_) => Err(ConfigError::Invalid {
            key: FETCH_CONCURRENCY_VAR,
            value: raw.to_string(),
            reason: "not a positive integer",
        }),
    }
}
