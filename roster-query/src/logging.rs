//! Logging setup.
//!
//! Roster logs through `tracing`. Installing a subscriber is left to the
//! application, but with the `tracing-subscriber` feature enabled
//! [`init`] installs one configured from the environment:
//!
//! - `ROSTER_DEBUG=true|1|yes` enables debug output
//! - `ROSTER_LOG_LEVEL=trace|debug|info|warn|error` sets the level
//! - `ROSTER_LOG_FORMAT=json|pretty|compact` picks the output format (default: json)
//!
//! ```rust,no_run
//! use roster_query::logging;
//!
//! logging::init();
//! ```
//!
//! Inside the workspace, rendered SQL is logged at `debug`, queries at
//! `info` when query logging is configured, and slow queries at `warn`.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "ROSTER_DEBUG";
const LEVEL_VAR: &str = "ROSTER_LOG_LEVEL";
const FORMAT_VAR: &str = "ROSTER_LOG_FORMAT";

/// Log targets configured by [`init`].
const TARGETS: [&str; 3] = ["roster", "roster_query", "roster_sqlite"];

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to JSON.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }
}

/// Whether `ROSTER_DEBUG` asks for debug output.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The level requested by `ROSTER_LOG_LEVEL`, else `debug` when
/// `ROSTER_DEBUG` is set, else `warn`.
pub fn log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var(LEVEL_VAR) {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The format requested by `ROSTER_LOG_FORMAT`.
pub fn log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::parse(&f))
        .unwrap_or_default()
}

/// Directive string for an `EnvFilter` covering the workspace crates.
pub fn filter_directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install a subscriber configured from the environment.
///
/// Does nothing unless `ROSTER_DEBUG` or `ROSTER_LOG_LEVEL` is set, or when
/// another global subscriber is already installed. Later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = log_level();
            let filter = EnvFilter::try_new(filter_directives(level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));
            let format = log_format();

            let installed = match format {
                LogFormat::Json => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                LogFormat::Compact => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                LogFormat::Pretty => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = ?format, "Roster logging initialized");
            }
        }
    });
}

/// Set `ROSTER_LOG_LEVEL` and call [`init`].
///
/// # Safety
///
/// Modifies the process environment; call at startup before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as startup-only.
    unsafe {
        env::set_var(LEVEL_VAR, level);
    }
    init();
}

/// Log at debug level only when `ROSTER_DEBUG` is set.
#[macro_export]
macro_rules! roster_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(
            filter_directives("debug"),
            "roster=debug,roster_query=debug,roster_sqlite=debug"
        );
    }

    #[test]
    fn test_log_level_default() {
        // SAFETY: no other test in this crate touches these variables
        unsafe {
            env::remove_var(DEBUG_VAR);
            env::remove_var(LEVEL_VAR);
        }
        assert!(!is_debug_enabled());
        assert_eq!(log_level(), "warn");
    }
}
