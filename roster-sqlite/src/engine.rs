//! SQLite query engine.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use roster_query::error::QueryResult;
use roster_query::filter::FilterValue;
use roster_query::query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery};
use roster_query::search::DataSource;

use crate::config::SqliteConfig;
use crate::connection::SqliteConnection;
use crate::error::{SqliteError, SqliteResult};
use crate::types::to_sqlite_params;

/// Executes Roster queries on a SQLite connection.
///
/// Cloning is cheap; clones share the connection.
#[derive(Debug, Clone)]
pub struct SqliteEngine {
    conn: SqliteConnection,
    log_queries: bool,
    slow_query_threshold: Option<Duration>,
}

impl SqliteEngine {
    /// Create an engine over an open connection.
    pub fn new(conn: SqliteConnection) -> Self {
        Self {
            conn,
            log_queries: false,
            slow_query_threshold: None,
        }
    }

    /// Open a connection for `config` and wrap it.
    pub async fn connect(config: &SqliteConfig) -> SqliteResult<Self> {
        let conn = SqliteConnection::open(config).await?;
        Ok(Self {
            conn,
            log_queries: config.log_queries,
            slow_query_threshold: config.slow_query_threshold,
        })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &SqliteConnection {
        &self.conn
    }

    /// Run a select and return its rows as JSON objects.
    #[instrument(skip(self, query))]
    pub async fn fetch_all(&self, query: &SelectQuery) -> SqliteResult<Vec<JsonValue>> {
        let (sql, params) = query.to_sql();
        self.run_query(&sql, &params).await
    }

    /// Run a select and decode each row.
    pub async fn fetch_as<T: DeserializeOwned>(&self, query: &SelectQuery) -> SqliteResult<Vec<T>> {
        self.fetch_all(query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Run a select expected to return exactly one row.
    #[instrument(skip(self, query))]
    pub async fn fetch_one<T: DeserializeOwned>(&self, query: &SelectQuery) -> SqliteResult<T> {
        self.fetch_optional(query)
            .await?
            .ok_or_else(|| SqliteError::not_found("query returned no rows"))
    }

    /// Run a select expected to return at most one row.
    #[instrument(skip(self, query))]
    pub async fn fetch_optional<T: DeserializeOwned>(&self, query: &SelectQuery) -> SqliteResult<Option<T>> {
        let mut rows = self.fetch_all(query).await?;
        match rows.len() {
            0 => Ok(None),
            1 => rows.pop().map(decode).transpose(),
            n => Err(SqliteError::NotUnique(n)),
        }
    }

    /// Run a select limited to its first row.
    pub async fn fetch_first<T: DeserializeOwned>(&self, query: &SelectQuery) -> SqliteResult<Option<T>> {
        let limited = query.clone().take(1);
        self.fetch_all(&limited)
            .await?
            .into_iter()
            .next()
            .map(decode)
            .transpose()
    }

    /// Run a select returning one row with one column.
    #[instrument(skip(self, query))]
    pub async fn scalar<T: DeserializeOwned>(&self, query: &SelectQuery) -> SqliteResult<T> {
        let row: JsonValue = self
            .fetch_all(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SqliteError::not_found("scalar query returned no rows"))?;

        let value = row
            .as_object()
            .and_then(|obj| obj.values().next())
            .cloned()
            .ok_or_else(|| SqliteError::not_found("scalar query returned an empty row"))?;
        decode(value)
    }

    /// Number of rows `query` matches, ignoring ordering and paging.
    #[instrument(skip(self, query))]
    pub async fn count_rows(&self, query: &SelectQuery) -> SqliteResult<u64> {
        let count: i64 = self.scalar(&query.count_query()).await?;
        Ok(count.max(0) as u64)
    }

    /// Insert a row and return its id.
    #[instrument(skip(self, query))]
    pub async fn insert(&self, query: &InsertQuery) -> SqliteResult<i64> {
        let (sql, params) = query.to_sql();
        let started = self.log_start(&sql);
        let id = self
            .conn
            .execute_insert_params(&sql, to_sqlite_params(&params))
            .await?;
        self.log_finish(&sql, started);
        Ok(id)
    }

    /// Run a bulk update and return the number of affected rows.
    #[instrument(skip(self, query))]
    pub async fn update(&self, query: &UpdateQuery) -> SqliteResult<u64> {
        let (sql, params) = query.to_sql();
        self.run_execute(&sql, &params).await
    }

    /// Run a bulk delete and return the number of affected rows.
    #[instrument(skip(self, query))]
    pub async fn delete(&self, query: &DeleteQuery) -> SqliteResult<u64> {
        let (sql, params) = query.to_sql();
        self.run_execute(&sql, &params).await
    }

    /// Run several statements (schema setup).
    #[instrument(skip(self, sql), fields(sql_len = sql.len()))]
    pub async fn batch(&self, sql: &str) -> SqliteResult<()> {
        let started = self.log_start(sql);
        self.conn.execute_batch(sql).await?;
        self.log_finish(sql, started);
        Ok(())
    }

    async fn run_query(&self, sql: &str, params: &[FilterValue]) -> SqliteResult<Vec<JsonValue>> {
        let started = self.log_start(sql);
        let rows = self.conn.query_params(sql, to_sqlite_params(params)).await?;
        self.log_finish(sql, started);
        debug!(rows = rows.len(), "Query returned");
        Ok(rows)
    }

    async fn run_execute(&self, sql: &str, params: &[FilterValue]) -> SqliteResult<u64> {
        let started = self.log_start(sql);
        let affected = self.conn.execute_params(sql, to_sqlite_params(params)).await?;
        self.log_finish(sql, started);
        debug!(affected, "Statement applied");
        Ok(affected as u64)
    }

    fn log_start(&self, sql: &str) -> Instant {
        if self.log_queries {
            info!(sql = %sql, "Executing");
        } else {
            debug!(sql = %sql, "Executing");
        }
        Instant::now()
    }

    fn log_finish(&self, sql: &str, started: Instant) {
        let elapsed = started.elapsed();
        if let Some(threshold) = self.slow_query_threshold {
            if elapsed > threshold {
                warn!(
                    sql = %sql,
                    elapsed_ms = elapsed.as_millis() as u64,
                    threshold_ms = threshold.as_millis() as u64,
                    "Slow query"
                );
            }
        }
    }
}

fn decode<T: DeserializeOwned>(value: JsonValue) -> SqliteResult<T> {
    serde_json::from_value(value)
        .map_err(|e| SqliteError::deserialization(format!("failed to decode row: {}", e)))
}

#[async_trait]
impl DataSource for SqliteEngine {
    async fn fetch(&self, query: &SelectQuery) -> QueryResult<Vec<JsonValue>> {
        Ok(self.fetch_all(query).await?)
    }

    async fn count(&self, query: &SelectQuery) -> QueryResult<u64> {
        Ok(self.count_rows(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roster_query::{Filter, OrderByField, Path, TableRef};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        label: Option<String>,
    }

    fn items() -> TableRef {
        TableRef::aliased("item", "i")
    }

    async fn engine() -> SqliteEngine {
        let engine = SqliteEngine::connect(&SqliteConfig::memory().log_queries(true))
            .await
            .unwrap();
        engine
            .batch("CREATE TABLE item (id INTEGER PRIMARY KEY, label TEXT);")
            .await
            .unwrap();
        for label in [Some("a"), Some("b"), None] {
            engine
                .insert(&InsertQuery::into_table("item").value("label", label))
                .await
                .unwrap();
        }
        engine
    }

    #[tokio::test]
    async fn test_fetch_as() {
        let engine = engine().await;
        let label: Path<String> = Path::new("i", "label");
        let query = SelectQuery::new(items())
            .all_from("i")
            .order_by(label.asc().nulls_last());
        let rows: Vec<Item> = engine.fetch_as(&query).await.unwrap();
        assert_eq!(
            rows,
            vec![
                Item { id: 1, label: Some("a".into()) },
                Item { id: 2, label: Some("b".into()) },
                Item { id: 3, label: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_one_and_optional() {
        let engine = engine().await;
        let id: Path<i64> = Path::new("i", "id");

        let one: Item = engine
            .fetch_one(&SelectQuery::new(items()).r#where(id.eq(2)))
            .await
            .unwrap();
        assert_eq!(one.label.as_deref(), Some("b"));

        let none: Option<Item> = engine
            .fetch_optional(&SelectQuery::new(items()).r#where(id.eq(99)))
            .await
            .unwrap();
        assert!(none.is_none());

        let err = engine
            .fetch_one::<Item>(&SelectQuery::new(items()))
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::NotUnique(3)));
    }

    #[tokio::test]
    async fn test_fetch_first() {
        let engine = engine().await;
        let first: Option<Item> = engine
            .fetch_first(&SelectQuery::new(items()).order_by(OrderByField::desc("i.id")))
            .await
            .unwrap();
        assert_eq!(first.map(|i| i.id), Some(3));
    }

    #[tokio::test]
    async fn test_count_and_scalar() {
        let engine = engine().await;
        let label: Path<String> = Path::new("i", "label");
        let query = SelectQuery::new(items()).r#where(label.is_not_null()).take(1);
        assert_eq!(engine.count_rows(&query).await.unwrap(), 2);

        let max: i64 = engine
            .scalar(&SelectQuery::new(items()).expr(Path::<i64>::new("i", "id").max()))
            .await
            .unwrap();
        assert_eq!(max, 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let engine = engine().await;
        let label: Path<String> = Path::new("i", "label");

        let updated = engine
            .update(&UpdateQuery::new(items()).set(label.column().clone(), "z").r#where(label.is_null()))
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let deleted = engine
            .delete(&DeleteQuery::new(items()).r#where(Filter::Gt("i.id".into(), 1.into())))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(engine.count_rows(&SelectQuery::new(items())).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_syntax_error_code() {
        let engine = engine().await;
        let err: roster_query::QueryError = engine.batch("SELEC 1;").await.unwrap_err().into();
        assert_eq!(err.code, roster_query::ErrorCode::SqlSyntax);
    }

    #[tokio::test]
    async fn test_data_source_maps_closed_connection() {
        let engine = engine().await;
        engine.connection().clone().close().await.unwrap();
        let err = DataSource::fetch(&engine, &SelectQuery::new(items()))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
