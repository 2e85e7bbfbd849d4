//! Statement builders: SELECT, UPDATE, DELETE and INSERT.
//!
//! ```rust
//! use roster_query::{Column, Expr, Filter, OrderByField, SelectQuery, TableRef};
//!
//! let query = SelectQuery::new(TableRef::aliased("member", "m"))
//!     .column(Column::from("m.username"))
//!     .left_join(
//!         TableRef::aliased("team", "t"),
//!         Expr::column(Column::from("m.team_id")).eq(Expr::column(Column::from("t.id"))),
//!     )
//!     .r#where(Filter::Gte(Column::from("m.age"), 20.into()))
//!     .order_by(OrderByField::desc("m.age"))
//!     .take(10);
//!
//! let (sql, params) = query.to_sql();
//! assert_eq!(
//!     sql,
//!     "SELECT \"m\".\"username\" FROM \"member\" AS \"m\" \
//!      LEFT JOIN \"team\" AS \"t\" ON \"m\".\"team_id\" = \"t\".\"id\" \
//!      WHERE \"m\".\"age\" >= ?1 ORDER BY \"m\".\"age\" DESC LIMIT 10"
//! );
//! assert_eq!(params.len(), 1);
//! ```

use std::borrow::Cow;

use crate::column::Column;
use crate::expr::Expr;
use crate::filter::{Filter, FilterValue};
use crate::pagination::Pagination;
use crate::sql::SqlWriter;
use crate::types::{OrderBy, OrderByField};

/// Alias given to the derived table wrapped by [`SelectQuery::count_query`].
const COUNT_SOURCE_ALIAS: &str = "count_source";

/// What a FROM or JOIN item reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// A named table.
    Table(Cow<'static, str>),
    /// A derived table.
    Subquery(Box<SelectQuery>),
}

/// A table in a FROM or JOIN clause, optionally aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    /// The rows being read.
    pub source: TableSource,
    /// Alias used to qualify columns.
    pub alias: Option<Cow<'static, str>>,
}

impl TableRef {
    /// Reference a table by name.
    pub fn table(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            source: TableSource::Table(name.into()),
            alias: None,
        }
    }

    /// Reference a table under an alias.
    pub fn aliased(name: impl Into<Cow<'static, str>>, alias: impl Into<Cow<'static, str>>) -> Self {
        Self {
            source: TableSource::Table(name.into()),
            alias: Some(alias.into()),
        }
    }

    /// Read from a derived table.
    pub fn subquery(query: SelectQuery, alias: impl Into<Cow<'static, str>>) -> Self {
        Self {
            source: TableSource::Subquery(Box::new(query)),
            alias: Some(alias.into()),
        }
    }

    /// Name of the underlying table, if this is not a derived table.
    pub fn table_name(&self) -> Option<&str> {
        match &self.source {
            TableSource::Table(name) => Some(name),
            TableSource::Subquery(_) => None,
        }
    }

    /// Render `"name" AS "alias"`.
    pub fn write_sql(&self, w: &mut SqlWriter) {
        match &self.source {
            TableSource::Table(name) => w.push_identifier(name),
            TableSource::Subquery(query) => {
                w.push("(");
                query.write_sql(w);
                w.push(")");
            }
        }
        if let Some(alias) = &self.alias {
            w.push(" AS ");
            w.push_identifier(alias);
        }
    }
}

/// Join flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
}

impl JoinKind {
    /// Get the SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

/// A join against another table.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join flavour.
    pub kind: JoinKind,
    /// Joined table.
    pub table: TableRef,
    /// ON condition. `Filter::None` renders as `ON 1 = 1`.
    pub on: Filter,
}

impl Join {
    fn write_sql(&self, w: &mut SqlWriter) {
        w.push(self.kind.as_sql());
        w.push(" ");
        self.table.write_sql(w);
        w.push(" ON ");
        self.on.write_sql(w);
    }
}

/// One item of a SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    All,
    /// `"alias".*`
    AllFrom(Cow<'static, str>),
    /// An expression with an optional output name.
    Expr {
        /// The selected expression.
        expr: Expr,
        /// Output column name (`AS ...`).
        alias: Option<Cow<'static, str>>,
    },
}

impl SelectItem {
    fn write_sql(&self, w: &mut SqlWriter) {
        match self {
            Self::All => w.push("*"),
            Self::AllFrom(table) => {
                w.push_identifier(table);
                w.push(".*");
            }
            Self::Expr { expr, alias } => {
                expr.write_sql(w);
                if let Some(alias) = alias {
                    w.push(" AS ");
                    w.push_identifier(alias);
                }
            }
        }
    }
}

/// A SELECT statement.
///
/// An empty projection selects `*`; `Filter::None` omits the WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    from: Vec<TableRef>,
    items: Vec<SelectItem>,
    distinct: bool,
    joins: Vec<Join>,
    filter: Filter,
    group_by: Vec<Expr>,
    having: Filter,
    order_by: OrderBy,
    pagination: Pagination,
}

impl SelectQuery {
    /// Start a query reading from `table`.
    pub fn new(table: TableRef) -> Self {
        Self {
            from: vec![table],
            items: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            filter: Filter::None,
            group_by: Vec::new(),
            having: Filter::None,
            order_by: OrderBy::none(),
            pagination: Pagination::new(),
        }
    }

    /// Add another FROM table (cross product, filtered in WHERE).
    pub fn also_from(mut self, table: TableRef) -> Self {
        self.from.push(table);
        self
    }

    /// Add a select item.
    pub fn select(mut self, item: SelectItem) -> Self {
        self.items.push(item);
        self
    }

    /// Select an expression under its natural name.
    pub fn expr(self, expr: impl Into<Expr>) -> Self {
        self.select(SelectItem::Expr {
            expr: expr.into(),
            alias: None,
        })
    }

    /// Select an expression under an output name.
    pub fn expr_as(self, expr: impl Into<Expr>, alias: impl Into<Cow<'static, str>>) -> Self {
        self.select(SelectItem::Expr {
            expr: expr.into(),
            alias: Some(alias.into()),
        })
    }

    /// Select a column.
    pub fn column(self, column: impl Into<Column>) -> Self {
        self.expr(Expr::Column(column.into()))
    }

    /// Select several columns.
    pub fn columns(self, columns: impl IntoIterator<Item = Column>) -> Self {
        columns.into_iter().fold(self, |q, c| q.column(c))
    }

    /// Select every column of an aliased table.
    pub fn all_from(self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.select(SelectItem::AllFrom(alias.into()))
    }

    /// Deduplicate result rows.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a join.
    pub fn join(mut self, kind: JoinKind, table: TableRef, on: Filter) -> Self {
        self.joins.push(Join { kind, table, on });
        self
    }

    /// Add an inner join.
    pub fn inner_join(self, table: TableRef, on: Filter) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Add a left outer join.
    pub fn left_join(self, table: TableRef, on: Filter) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    /// Add a filter condition, ANDed with any existing one.
    pub fn r#where(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = std::mem::take(&mut self.filter).and_then(filter.into());
        self
    }

    /// Add a GROUP BY key.
    pub fn group_by(mut self, expr: impl Into<Expr>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Add a HAVING condition, ANDed with any existing one.
    pub fn having(mut self, filter: Filter) -> Self {
        self.having = std::mem::take(&mut self.having).and_then(filter);
        self
    }

    /// Append a sort key.
    pub fn order_by(mut self, field: OrderByField) -> Self {
        self.order_by = std::mem::take(&mut self.order_by).then(field);
        self
    }

    /// Replace the sort keys.
    pub fn order_by_all(mut self, order: impl Into<OrderBy>) -> Self {
        self.order_by = order.into();
        self
    }

    /// Skip a number of rows.
    pub fn skip(mut self, n: u64) -> Self {
        self.pagination = self.pagination.skip(n);
        self
    }

    /// Take a limited number of rows.
    pub fn take(mut self, n: u64) -> Self {
        self.pagination = self.pagination.take(n);
        self
    }

    /// Replace the LIMIT/OFFSET clause.
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// The WHERE condition.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// The sort keys.
    pub fn ordering(&self) -> &OrderBy {
        &self.order_by
    }

    /// The LIMIT/OFFSET clause.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Whether rows are grouped or deduplicated, so that one output row
    /// may stand for several source rows.
    pub fn is_grouped(&self) -> bool {
        self.distinct || !self.group_by.is_empty()
    }

    /// A query counting the rows this query would return without its
    /// ordering and LIMIT/OFFSET.
    ///
    /// Grouped and distinct queries are wrapped in a derived table so the
    /// count is over output rows, not source rows.
    pub fn count_query(&self) -> SelectQuery {
        let mut inner = self.clone();
        inner.order_by = OrderBy::none();
        inner.pagination = Pagination::new();

        if inner.is_grouped() {
            return SelectQuery::new(TableRef::subquery(inner, COUNT_SOURCE_ALIAS))
                .expr_as(Expr::CountAll, "count");
        }

        inner.items = vec![SelectItem::Expr {
            expr: Expr::CountAll,
            alias: Some(Cow::Borrowed("count")),
        }];
        inner
    }

    /// Generate SQL with `?N` placeholders.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let mut w = SqlWriter::new();
        self.write_sql(&mut w);
        w.finish()
    }

    /// Render into a shared writer (placeholders continue its numbering).
    pub fn write_sql(&self, w: &mut SqlWriter) {
        w.push("SELECT ");
        if self.distinct {
            w.push("DISTINCT ");
        }
        if self.items.is_empty() {
            w.push("*");
        } else {
            w.push_list(&self.items, |w, item| item.write_sql(w));
        }

        w.push(" FROM ");
        w.push_list(&self.from, |w, t| t.write_sql(w));

        for join in &self.joins {
            w.push(" ");
            join.write_sql(w);
        }

        if !self.filter.is_none() {
            w.push(" WHERE ");
            self.filter.write_sql(w);
        }

        if !self.group_by.is_empty() {
            w.push(" GROUP BY ");
            w.push_list(&self.group_by, |w, e| e.write_sql(w));
        }

        if !self.having.is_none() {
            w.push(" HAVING ");
            self.having.write_sql(w);
        }

        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            self.order_by.write_sql(w);
        }

        let pagination = self.pagination.to_sql();
        if !pagination.is_empty() {
            w.push(" ");
            w.push(&pagination);
        }
    }
}

/// A bulk UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    table: TableRef,
    assignments: Vec<(Column, Expr)>,
    filter: Filter,
}

impl UpdateQuery {
    /// Update rows of `table`.
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            filter: Filter::None,
        }
    }

    /// Assign a value or expression to a column.
    pub fn set(mut self, column: impl Into<Column>, value: impl Into<Expr>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    /// Add a filter condition, ANDed with any existing one.
    pub fn r#where(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = std::mem::take(&mut self.filter).and_then(filter.into());
        self
    }

    /// Whether no column is assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Generate SQL with `?N` placeholders.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let mut w = SqlWriter::new();
        w.push("UPDATE ");
        self.table.write_sql(&mut w);
        w.push(" SET ");
        w.push_list(&self.assignments, |w, (column, value)| {
            column.write_unqualified(w);
            w.push(" = ");
            value.write_sql(w);
        });
        if !self.filter.is_none() {
            w.push(" WHERE ");
            self.filter.write_sql(&mut w);
        }
        w.finish()
    }
}

/// A bulk DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    table: TableRef,
    filter: Filter,
}

impl DeleteQuery {
    /// Delete rows of `table`.
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            filter: Filter::None,
        }
    }

    /// Add a filter condition, ANDed with any existing one.
    pub fn r#where(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = std::mem::take(&mut self.filter).and_then(filter.into());
        self
    }

    /// Generate SQL with `?N` placeholders.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let mut w = SqlWriter::new();
        w.push("DELETE FROM ");
        self.table.write_sql(&mut w);
        if !self.filter.is_none() {
            w.push(" WHERE ");
            self.filter.write_sql(&mut w);
        }
        w.finish()
    }
}

/// A single-row INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    table: Cow<'static, str>,
    values: Vec<(Column, FilterValue)>,
}

impl InsertQuery {
    /// Insert into `table`.
    pub fn into_table(table: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn value(mut self, column: impl Into<Column>, value: impl Into<FilterValue>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Generate SQL with `?N` placeholders.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let mut w = SqlWriter::new();
        w.push("INSERT INTO ");
        w.push_identifier(&self.table);
        if self.values.is_empty() {
            w.push(" DEFAULT VALUES");
            return w.finish();
        }
        w.push(" (");
        w.push_list(&self.values, |w, (column, _)| column.write_unqualified(w));
        w.push(") VALUES (");
        w.push_list(&self.values, |w, (_, value)| w.bind(value.clone()));
        w.push(")");
        w.finish()
    }
}
