//! SQLite data source for Roster.
//!
//! Runs `roster-query` statements through `tokio-rusqlite`, which keeps the
//! `rusqlite` connection on its own thread and exposes it to async code.
//!
//! # Features
//!
//! - In-memory and file-based databases
//! - URL-based configuration (`sqlite::memory:`, `sqlite://path?options`)
//! - Rows returned as JSON objects and decoded with serde
//! - [`SqliteEngine`] implements [`roster_query::DataSource`] for paged search
//!
//! # Example
//!
//! ```rust,ignore
//! use roster_sqlite::{SqliteConfig, SqliteEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SqliteConfig::from_url("sqlite::memory:")?;
//!     let engine = SqliteEngine::connect(&config).await?;
//!     engine.batch("CREATE TABLE team (id INTEGER PRIMARY KEY, name TEXT NOT NULL);").await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod types;

pub use config::{DatabasePath, JournalMode, SqliteConfig};
pub use connection::SqliteConnection;
pub use engine::SqliteEngine;
pub use error::{SqliteError, SqliteResult};
