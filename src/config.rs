//! Configuration file parsing for `roster.toml`.
//!
//! ```toml
//! [database]
//! url = "${DATABASE_URL}"
//! foreign_keys = true
//!
//! [search]
//! default_page_size = 20
//! count_strategy = "always"
//!
//! [debug]
//! log_queries = false
//! slow_query_threshold = 1000
//!
//! [environments.test]
//! database = { url = "sqlite::memory:" }
//! debug = { log_queries = true }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use roster_query::{CountStrategy, PageRequest, QueryError};
use roster_sqlite::SqliteConfig;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the `[environments.<name>]` block to apply.
pub const ENVIRONMENT_VAR: &str = "ROSTER_ENV";

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid config: {source}")]
    Toml {
        /// Underlying parse error.
        #[from]
        source: toml::de::Error,
    },

    /// A `${VAR}` reference names an unset variable.
    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    /// A value parsed but is not acceptable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl From<ConfigError> for QueryError {
    fn from(err: ConfigError) -> Self {
        QueryError::configuration(err.to_string())
    }
}

/// Main configuration structure for `roster.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchConfig,

    /// Statement logging.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Overrides keyed by environment name.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl RosterConfig {
    /// Load a file and apply the environment named by `ROSTER_ENV`, if any.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = Self::from_file(path)?;
        match std::env::var(ENVIRONMENT_VAR) {
            Ok(env) => config.with_environment(&env),
            Err(_) => Ok(config),
        }
    }

    /// Read, expand and validate a `roster.toml`.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        content.parse()
    }

    /// Apply the overrides of one `[environments.<name>]` block.
    ///
    /// Unknown environment names leave the configuration unchanged.
    pub fn with_environment(mut self, env: &str) -> ConfigResult<Self> {
        let Some(overrides) = self.environments.remove(env) else {
            debug!(env, "No overrides for environment");
            return Ok(self);
        };

        if let Some(db) = overrides.database {
            if let Some(url) = db.url {
                self.database.url = url;
            }
            if let Some(foreign_keys) = db.foreign_keys {
                self.database.foreign_keys = foreign_keys;
            }
            if let Some(timeout) = db.busy_timeout_ms {
                self.database.busy_timeout_ms = Some(timeout);
            }
        }
        if let Some(search) = overrides.search {
            if let Some(size) = search.default_page_size {
                self.search.default_page_size = size;
            }
            if let Some(strategy) = search.count_strategy {
                self.search.count_strategy = strategy;
            }
        }
        if let Some(dbg) = overrides.debug {
            if let Some(log_queries) = dbg.log_queries {
                self.debug.log_queries = log_queries;
            }
            if let Some(threshold) = dbg.slow_query_threshold {
                self.debug.slow_query_threshold = threshold;
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Check values that TOML typing alone cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.search.default_page_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "search.default_page_size must be positive, got {}",
                self.search.default_page_size
            )));
        }
        Ok(())
    }

    /// The SQLite settings described by this configuration.
    pub fn sqlite_config(&self) -> ConfigResult<SqliteConfig> {
        let mut config = SqliteConfig::from_url(&self.database.url)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?
            .foreign_keys(self.database.foreign_keys)
            .log_queries(self.debug.log_queries);
        if let Some(ms) = self.database.busy_timeout_ms {
            config = config.busy_timeout(ms);
        }
        if self.debug.slow_query_threshold > 0 {
            config = config.slow_query_threshold(Duration::from_millis(self.debug.slow_query_threshold));
        }
        Ok(config)
    }

    /// First page at the configured default size.
    pub fn default_page(&self) -> PageRequest {
        PageRequest::new(0, self.search.default_page_size)
    }
}

impl FromStr for RosterConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> ConfigResult<Self> {
        let expanded = expand_env_vars(content)?;
        let config: Self = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }
}

/// The `[database]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `sqlite:` URL; `${VAR}` references are expanded.
    #[serde(default = "default_url")]
    pub url: String,

    /// Enforce foreign keys.
    #[serde(default = "default_true")]
    pub foreign_keys: bool,

    /// Lock wait in milliseconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            foreign_keys: true,
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

fn default_url() -> String {
    "sqlite::memory:".to_string()
}
fn default_true() -> bool {
    true
}
fn default_busy_timeout() -> Option<u32> {
    Some(5000)
}

/// Search defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Page size used when the caller does not choose one.
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    /// How page totals are computed.
    #[serde(default)]
    pub count_strategy: CountStrategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            count_strategy: CountStrategy::default(),
        }
    }
}

fn default_page_size() -> i64 {
    20
}

/// Debug configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every statement at info level.
    #[serde(default)]
    pub log_queries: bool,

    /// Warn about statements slower than this many milliseconds (0 disables).
    #[serde(default = "default_slow_query_threshold")]
    pub slow_query_threshold: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_queries: false,
            slow_query_threshold: default_slow_query_threshold(),
        }
    }
}

fn default_slow_query_threshold() -> u64 {
    1000
}

/// Overrides for one environment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Database overrides.
    pub database: Option<DatabaseOverride>,
    /// Search overrides.
    pub search: Option<SearchOverride>,
    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Database overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseOverride {
    /// Override URL.
    pub url: Option<String>,
    /// Override foreign key enforcement.
    pub foreign_keys: Option<bool>,
    /// Override busy timeout.
    pub busy_timeout_ms: Option<u32>,
}

/// Search overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchOverride {
    /// Override page size.
    pub default_page_size: Option<i64>,
    /// Override count strategy.
    pub count_strategy: Option<CountStrategy>,
}

/// Debug overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override query logging.
    pub log_queries: Option<bool>,
    /// Override slow query threshold.
    pub slow_query_threshold: Option<u64>,
}

/// Replace `${VAR}` references with the variable's value.
fn expand_env_vars(content: &str) -> ConfigResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

    let mut result = String::with_capacity(content.len());
    let mut last = 0;
    for cap in re.captures_iter(content) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let value = std::env::var(name.as_str())
            .map_err(|_| ConfigError::MissingEnvVar(name.as_str().to_string()))?;
        result.push_str(&content[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }
    result.push_str(&content[last..]);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RosterConfig::default();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.search.default_page_size, 20);
        assert_eq!(config.search.count_strategy, CountStrategy::Always);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: RosterConfig = r#"
            [search]
            count_strategy = "lazy"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.search.count_strategy, CountStrategy::Lazy);
        assert!(config.database.foreign_keys);
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: variable name unique to this test
        unsafe {
            std::env::set_var("ROSTER_CONFIG_TEST_URL", "sqlite://./expanded.db");
        }
        let expanded = expand_env_vars("url = \"${ROSTER_CONFIG_TEST_URL}\"").unwrap();
        assert_eq!(expanded, "url = \"sqlite://./expanded.db\"");
    }

    #[test]
    fn test_missing_env_var() {
        let err = expand_env_vars("url = \"${ROSTER_CONFIG_TEST_UNSET}\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "ROSTER_CONFIG_TEST_UNSET"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = "[database]\nprovider = \"postgres\"".parse::<RosterConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn test_invalid_page_size() {
        let err = "[search]\ndefault_page_size = 0".parse::<RosterConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_sqlite_config() {
        let config: RosterConfig = r#"
            [database]
            url = "sqlite::memory:"
            foreign_keys = false

            [debug]
            log_queries = true
            slow_query_threshold = 0
        "#
        .parse()
        .unwrap();
        let sqlite = config.sqlite_config().unwrap();
        assert!(sqlite.path.is_memory());
        assert!(!sqlite.foreign_keys);
        assert!(sqlite.log_queries);
        assert!(sqlite.slow_query_threshold.is_none());
    }
}
