//! Connection settings and `sqlite:` URL parsing.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{SqliteError, SqliteResult};

/// How to open and run a SQLite connection.
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Database location.
    pub path: DatabasePath,
    /// `PRAGMA foreign_keys`.
    pub foreign_keys: bool,
    /// `PRAGMA busy_timeout`, in milliseconds. `None` keeps SQLite's default.
    pub busy_timeout_ms: Option<u32>,
    /// `PRAGMA journal_mode`.
    pub journal_mode: JournalMode,
    /// Log every statement at info level.
    pub log_queries: bool,
    /// Statements slower than this are logged as warnings.
    pub slow_query_threshold: Option<Duration>,
}

/// Where the database lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabasePath {
    /// Private to one connection and gone once it closes.
    #[default]
    Memory,
    /// A database file, created on first open.
    File(PathBuf),
}

impl DatabasePath {
    /// True for [`DatabasePath::Memory`].
    pub fn is_memory(&self) -> bool {
        *self == Self::Memory
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str(":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Rollback journal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// `DELETE`
    Delete,
    /// `TRUNCATE`
    Truncate,
    /// `MEMORY`
    Memory,
    /// `WAL`; not available for in-memory databases.
    Wal,
    /// `OFF`
    Off,
}

impl JournalMode {
    const ALL: [JournalMode; 5] = [
        Self::Delete,
        Self::Truncate,
        Self::Memory,
        Self::Wal,
        Self::Off,
    ];

    /// Value for `PRAGMA journal_mode`.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }
}

impl FromStr for JournalMode {
    type Err = SqliteError;

    fn from_str(value: &str) -> SqliteResult<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_pragma().eq_ignore_ascii_case(value))
            .ok_or_else(|| SqliteError::config(format!("unknown journal mode '{}'", value)))
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl SqliteConfig {
    /// In-memory database with foreign keys on and a 5s busy timeout.
    pub fn memory() -> Self {
        Self {
            path: DatabasePath::Memory,
            foreign_keys: true,
            busy_timeout_ms: Some(5_000),
            journal_mode: JournalMode::Memory,
            log_queries: false,
            slow_query_threshold: None,
        }
    }

    /// Database file at `path`, journaled with WAL.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: DatabasePath::File(path.as_ref().into()),
            journal_mode: JournalMode::Wal,
            ..Self::memory()
        }
    }

    /// Settings from a connection URL.
    ///
    /// Accepts `sqlite::memory:`, `:memory:`, `sqlite://<path>` and
    /// `sqlite:<path>`, optionally followed by `?key=value&...` with keys
    /// `mode=memory`, `foreign_keys`, `busy_timeout` and `journal_mode`.
    /// Unknown keys are ignored.
    ///
    /// ```rust
    /// use roster_sqlite::SqliteConfig;
    ///
    /// let config = SqliteConfig::from_url("sqlite::memory:").unwrap();
    /// assert!(config.path.is_memory());
    ///
    /// let config = SqliteConfig::from_url("sqlite://./roster.db?busy_timeout=100").unwrap();
    /// assert_eq!(config.busy_timeout_ms, Some(100));
    /// ```
    pub fn from_url(url: impl AsRef<str>) -> SqliteResult<Self> {
        let url = url.as_ref();
        let (location, options) = url.split_once('?').unwrap_or((url, ""));

        let location = ["sqlite://", "sqlite:"]
            .iter()
            .find_map(|scheme| location.strip_prefix(scheme))
            .unwrap_or(location);

        let mut config = match location {
            "" => return Err(SqliteError::config("database path is required")),
            ":memory:" => Self::memory(),
            file => Self::file(file),
        };

        for (key, value) in options.split('&').filter_map(|kv| kv.split_once('=')) {
            match key {
                "mode" if value == "memory" => config.path = DatabasePath::Memory,
                "foreign_keys" => config.foreign_keys = is_truthy(value),
                "busy_timeout" => {
                    let ms = value.parse::<u32>().map_err(|_| {
                        SqliteError::config(format!("invalid busy_timeout '{}'", value))
                    })?;
                    config.busy_timeout_ms = Some(ms);
                }
                "journal_mode" => config.journal_mode = value.parse()?,
                _ => {}
            }
        }

        // WAL needs a file to put the log next to.
        if config.path.is_memory() && config.journal_mode == JournalMode::Wal {
            config.journal_mode = JournalMode::Memory;
        }

        Ok(config)
    }

    /// The PRAGMA batch run on every new connection.
    pub fn pragmas(&self) -> String {
        let mut batch = String::new();
        let on_off = if self.foreign_keys { "ON" } else { "OFF" };
        let _ = writeln!(batch, "PRAGMA foreign_keys = {};", on_off);
        let _ = writeln!(batch, "PRAGMA journal_mode = {};", self.journal_mode.as_pragma());
        if let Some(ms) = self.busy_timeout_ms {
            let _ = writeln!(batch, "PRAGMA busy_timeout = {};", ms);
        }
        batch
    }

    /// Toggle foreign key enforcement.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Wait up to `ms` for a locked database.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = Some(ms);
        self
    }

    /// Log every statement at info level.
    pub fn log_queries(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    /// Warn about statements slower than `threshold`.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }
}

fn is_truthy(value: &str) -> bool {
    ["true", "1", "on", "yes"]
        .iter()
        .any(|t| t.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_defaults() {
        let memory = SqliteConfig::memory();
        assert_eq!(memory.path.to_string(), ":memory:");
        assert_eq!(memory.journal_mode, JournalMode::Memory);
        assert_eq!(memory.busy_timeout_ms, Some(5_000));
        assert!(memory.foreign_keys);
    }

    #[test]
    fn test_memory_urls() {
        for url in ["sqlite::memory:", ":memory:", "sqlite://ignored.db?mode=memory"] {
            assert!(SqliteConfig::from_url(url).unwrap().path.is_memory(), "{}", url);
        }
    }

    #[test]
    fn test_file_url() {
        let file = SqliteConfig::from_url("sqlite:data/roster.db").unwrap();
        assert_eq!(file.path, DatabasePath::File(PathBuf::from("data/roster.db")));
        assert_eq!(file.journal_mode, JournalMode::Wal);
    }

    #[test]
    fn test_url_options() {
        let tuned =
            SqliteConfig::from_url("sqlite://./r.db?foreign_keys=off&busy_timeout=750&journal_mode=Truncate")
                .unwrap();
        assert!(!tuned.foreign_keys);
        assert_eq!(tuned.busy_timeout_ms, Some(750));
        assert_eq!(tuned.journal_mode, JournalMode::Truncate);
    }

    #[test]
    fn test_url_rejects_bad_values() {
        assert!(SqliteConfig::from_url("sqlite://").is_err());
        assert!(SqliteConfig::from_url("sqlite://x.db?busy_timeout=soon").is_err());
        assert!(SqliteConfig::from_url("sqlite://x.db?journal_mode=fast").is_err());
    }

    #[test]
    fn test_memory_never_uses_wal() {
        let config = SqliteConfig::from_url("sqlite::memory:?journal_mode=wal").unwrap();
        assert_eq!(config.journal_mode, JournalMode::Memory);
    }

    #[test]
    fn test_pragmas() {
        let batch = SqliteConfig::memory().foreign_keys(false).busy_timeout(250).pragmas();
        assert_eq!(
            batch,
            "PRAGMA foreign_keys = OFF;\nPRAGMA journal_mode = MEMORY;\nPRAGMA busy_timeout = 250;\n"
        );
    }
}
