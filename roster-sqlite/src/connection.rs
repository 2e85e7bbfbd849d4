//! SQLite connection handle.

use rusqlite::types::Value;
use tokio_rusqlite::Connection;
use tracing::{debug, trace};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::SqliteResult;
use crate::types::row_to_json;

/// A cloneable handle to one SQLite connection.
///
/// The connection lives on a dedicated thread owned by `tokio-rusqlite`;
/// every clone talks to the same database. An in-memory database exists
/// only as long as that connection, so clones share it rather than opening
/// new connections.
#[derive(Clone)]
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    /// Open a connection and apply the configured pragmas.
    pub async fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        debug!(path = %config.path, "Opening SQLite connection");
        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory().await?,
            DatabasePath::File(path) => Connection::open(path).await?,
        };

        let pragmas = config.pragmas();
        conn.call(move |conn| {
            conn.execute_batch(&pragmas)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Run a query and return every row as a JSON object.
    pub async fn query_params(&self, sql: &str, params: Vec<Value>) -> SqliteResult<Vec<serde_json::Value>> {
        let sql = sql.to_string();
        trace!(sql = %sql, params = params.len(), "query");

        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let columns: Vec<String> = stmt
                    .column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect();

                let rows = stmt
                    .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                        row_to_json(row, &columns)
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }

    /// Run a statement and return the number of affected rows.
    pub async fn execute_params(&self, sql: &str, params: Vec<Value>) -> SqliteResult<usize> {
        let sql = sql.to_string();
        trace!(sql = %sql, params = params.len(), "execute");

        let affected = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                Ok(stmt.execute(rusqlite::params_from_iter(params.iter()))?)
            })
            .await?;
        Ok(affected)
    }

    /// Run an INSERT and return the new row id.
    pub async fn execute_insert_params(&self, sql: &str, params: Vec<Value>) -> SqliteResult<i64> {
        let sql = sql.to_string();
        trace!(sql = %sql, params = params.len(), "insert");

        let id = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                stmt.execute(rusqlite::params_from_iter(params.iter()))?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// Run several semicolon-separated statements.
    pub async fn execute_batch(&self, sql: &str) -> SqliteResult<()> {
        let sql = sql.to_string();
        trace!(sql_len = sql.len(), "batch");

        self.conn
            .call(move |conn| {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Whether the connection still answers queries.
    pub async fn is_healthy(&self) -> bool {
        self.conn
            .call(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
            .await
            .is_ok()
    }

    /// Close the connection. Clones of this handle fail from then on.
    pub async fn close(self) -> SqliteResult<()> {
        debug!("Closing SQLite connection");
        self.conn.close().await?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection").finish_non_exhaustive()
    }
}
