//! Paged search over a data source.
//!
//! A [`SearchExecutor`] takes a base [`SelectQuery`] (projection, joins),
//! narrows it with the predicate of a [`SearchCondition`], applies sort keys
//! and a validated [`PageRequest`], and hands the result to a [`DataSource`].
//!
//! ```rust,ignore
//! let page: Page<MemberTeamDto> = SearchExecutor::new(&engine, base_query)
//!     .count_strategy(CountStrategy::Lazy)
//!     .search(&condition, PageRequest::new(0, 3), [member.username.desc()])
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::filter::Filter;
use crate::pagination::{CountStrategy, Page, PageRequest};
use crate::predicate::combine;
use crate::query::SelectQuery;
use crate::types::OrderByField;

/// Something that executes select queries.
///
/// Rows come back as JSON objects keyed by output column name.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Run `query` and return its rows.
    async fn fetch(&self, query: &SelectQuery) -> QueryResult<Vec<serde_json::Value>>;

    /// Count the rows `query` matches, ignoring its ordering and LIMIT/OFFSET.
    async fn count(&self, query: &SelectQuery) -> QueryResult<u64>;
}

/// A value object of optional search fields.
pub trait SearchCondition {
    /// One entry per field, `None` where the field is absent.
    fn constraints(&self) -> Vec<Option<Filter>>;

    /// The conjunction of the present constraints.
    fn predicate(&self) -> Filter {
        combine(self.constraints())
    }
}

impl SearchCondition for Filter {
    fn constraints(&self) -> Vec<Option<Filter>> {
        vec![Some(self.clone())]
    }
}

/// Runs dynamic searches against a [`DataSource`].
///
/// The executor borrows the source and never opens or closes it.
pub struct SearchExecutor<'a, S: ?Sized> {
    source: &'a S,
    base: SelectQuery,
    count_strategy: CountStrategy,
}

impl<'a, S: DataSource + ?Sized> SearchExecutor<'a, S> {
    /// Create an executor over `base`.
    pub fn new(source: &'a S, base: SelectQuery) -> Self {
        Self {
            source,
            base,
            count_strategy: CountStrategy::default(),
        }
    }

    /// Choose how totals are computed.
    pub fn count_strategy(mut self, strategy: CountStrategy) -> Self {
        self.count_strategy = strategy;
        self
    }

    /// The query a search for `condition` would run, before paging.
    pub fn build_query<C>(&self, condition: &C, sort: impl IntoIterator<Item = OrderByField>) -> SelectQuery
    where
        C: SearchCondition + ?Sized,
    {
        sort.into_iter().fold(
            self.base.clone().r#where(condition.predicate()),
            SelectQuery::order_by,
        )
    }

    /// Every row matching `condition`, in `sort` order.
    pub async fn list<T, C>(
        &self,
        condition: &C,
        sort: impl IntoIterator<Item = OrderByField>,
    ) -> QueryResult<Vec<T>>
    where
        T: DeserializeOwned,
        C: SearchCondition + ?Sized,
    {
        let query = self.build_query(condition, sort);
        let rows = self.source.fetch(&query).await?;
        decode_rows(rows)
    }

    /// One page of rows matching `condition`, plus the total match count.
    ///
    /// Fails with `InvalidPageRequest` before touching the data source when
    /// the offset is negative or the limit is not positive.
    pub async fn search<T, C>(
        &self,
        condition: &C,
        page: PageRequest,
        sort: impl IntoIterator<Item = OrderByField>,
    ) -> QueryResult<Page<T>>
    where
        T: DeserializeOwned,
        C: SearchCondition + ?Sized,
    {
        let pagination = page.validate()?;
        let offset = pagination.skip.unwrap_or(0);
        let limit = pagination.take.unwrap_or(0);

        let query = self.build_query(condition, sort).paginate(pagination);
        debug!(
            offset,
            limit,
            strategy = ?self.count_strategy,
            conditions = query.filter().condition_count(),
            "Running paged search"
        );

        let rows = self.source.fetch(&query).await?;
        let total = match self.count_strategy.known_total(offset, limit, rows.len()) {
            Some(total) => total,
            None => self.source.count(&query).await?,
        };

        Ok(Page::new(decode_rows(rows)?, total, offset, limit))
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<serde_json::Value>) -> QueryResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| {
                QueryError::deserialization(format!("Failed to decode row: {}", e)).with_source(e)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use crate::query::TableRef;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        username: String,
    }

    /// Returns canned rows and records what it was asked.
    struct FakeSource {
        rows: Vec<serde_json::Value>,
        total: u64,
        calls: Mutex<Vec<&'static str>>,
        unavailable: bool,
    }

    impl FakeSource {
        fn new(rows: Vec<serde_json::Value>, total: u64) -> Self {
            Self {
                rows,
                total,
                calls: Mutex::new(Vec::new()),
                unavailable: false,
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DataSource for FakeSource {
        async fn fetch(&self, _query: &SelectQuery) -> QueryResult<Vec<serde_json::Value>> {
            self.calls.lock().unwrap().push("fetch");
            if self.unavailable {
                return Err(QueryError::data_source_unavailable("connection refused"));
            }
            Ok(self.rows.clone())
        }

        async fn count(&self, _query: &SelectQuery) -> QueryResult<u64> {
            self.calls.lock().unwrap().push("count");
            Ok(self.total)
        }
    }

    struct ByName(Option<String>);

    impl SearchCondition for ByName {
        fn constraints(&self) -> Vec<Option<Filter>> {
            let username: Path<String> = Path::new("m", "username");
            vec![username.eq_opt(self.0.clone())]
        }
    }

    fn base() -> SelectQuery {
        SelectQuery::new(TableRef::aliased("member", "m"))
    }

    #[tokio::test]
    async fn test_invalid_page_never_reaches_source() {
        let source = FakeSource::new(vec![], 0);
        let err = SearchExecutor::new(&source, base())
            .search::<Row, _>(&ByName(None), PageRequest::new(0, 0), [])
            .await
            .unwrap_err();
        assert!(err.is_invalid_page_request());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_always_counts() {
        let source = FakeSource::new(vec![json!({"username": "member1"})], 1);
        let page: Page<Row> = SearchExecutor::new(&source, base())
            .search(&ByName(Some("member1".into())), PageRequest::new(0, 10), [])
            .await
            .unwrap();
        assert_eq!(page.total(), 1);
        assert_eq!(page.content()[0].username, "member1");
        assert_eq!(source.calls(), vec!["fetch", "count"]);
    }

    #[tokio::test]
    async fn test_lazy_skips_count_on_short_first_page() {
        let source = FakeSource::new(vec![json!({"username": "member1"})], 99);
        let page: Page<Row> = SearchExecutor::new(&source, base())
            .count_strategy(CountStrategy::Lazy)
            .search(&ByName(None), PageRequest::new(0, 10), [])
            .await
            .unwrap();
        assert_eq!(page.total(), 1);
        assert_eq!(source.calls(), vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_unavailable_is_surfaced() {
        let mut source = FakeSource::new(vec![], 0);
        source.unavailable = true;
        let err = SearchExecutor::new(&source, base())
            .search::<Row, _>(&ByName(None), PageRequest::new(0, 5), [])
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(source.calls(), vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_bad_row_is_deserialization_error() {
        let source = FakeSource::new(vec![json!({"age": 10})], 1);
        let err = SearchExecutor::new(&source, base())
            .list::<Row, _>(&ByName(None), [])
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::DeserializationError);
    }

    #[test]
    fn test_build_query_applies_condition_and_sort() {
        let source = FakeSource::new(vec![], 0);
        let username: Path<String> = Path::new("m", "username");
        let query = SearchExecutor::new(&source, base())
            .build_query(&ByName(Some("member2".into())), [username.desc()]);
        let (sql, params) = query.to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"member\" AS \"m\" WHERE \"m\".\"username\" = ?1 \
             ORDER BY \"m\".\"username\" DESC"
        );
        assert_eq!(params.len(), 1);
    }
}
