//! Typed column handles.
//!
//! A [`Path<T>`] names a column whose values are of type `T`, so comparisons
//! only accept values of the right type.
//!
//! ```rust
//! use roster_query::{Filter, Path};
//!
//! let age: Path<i32> = Path::new("m", "age");
//! let username: Path<String> = Path::new("m", "username");
//!
//! let filter = Filter::and([age.goe(20), username.starts_with("member")]);
//! let (sql, params) = filter.to_sql();
//! assert_eq!(sql, "(\"m\".\"age\" >= ?1 AND \"m\".\"username\" GLOB ?2)");
//! assert_eq!(params.len(), 2);
//!
//! // Absent values produce no constraint
//! assert!(username.eq_opt(None::<String>).is_none());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::column::Column;
use crate::expr::{AggregateFn, CaseWhen, CaseWhenBuilder, Expr};
use crate::filter::{Filter, FilterValue};
use crate::query::SelectQuery;
use crate::types::OrderByField;

/// A typed reference to a column.
pub struct Path<T> {
    column: Column,
    _type: PhantomData<fn() -> T>,
}

impl<T> Path<T> {
    /// Create a path for `table.name`.
    pub fn new(table: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            column: Column::qualified(table, name),
            _type: PhantomData,
        }
    }

    /// Create a path from an existing column.
    pub fn from_column(column: Column) -> Self {
        Self {
            column,
            _type: PhantomData,
        }
    }

    /// The underlying column.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// The column name without its table alias.
    pub fn name(&self) -> &str {
        &self.column.name
    }

    /// This path as an expression.
    pub fn expr(&self) -> Expr {
        Expr::Column(self.column.clone())
    }

    /// `IS NULL`
    pub fn is_null(&self) -> Filter {
        Filter::IsNull(self.column.clone())
    }

    /// `IS NOT NULL`
    pub fn is_not_null(&self) -> Filter {
        Filter::IsNotNull(self.column.clone())
    }

    /// Column-to-column equality (join conditions, theta joins).
    pub fn eq_path(&self, other: &Path<T>) -> Filter {
        self.expr().eq(other.expr())
    }

    /// `self = expr`
    pub fn eq_expr(&self, expr: impl Into<Expr>) -> Filter {
        self.expr().eq(expr)
    }

    /// `self >= expr`
    pub fn goe_expr(&self, expr: impl Into<Expr>) -> Filter {
        self.expr().goe(expr)
    }

    /// `self > expr`
    pub fn gt_expr(&self, expr: impl Into<Expr>) -> Filter {
        self.expr().gt(expr)
    }

    /// `self <= expr`
    pub fn loe_expr(&self, expr: impl Into<Expr>) -> Filter {
        self.expr().loe(expr)
    }

    /// `self < expr`
    pub fn lt_expr(&self, expr: impl Into<Expr>) -> Filter {
        self.expr().lt(expr)
    }

    /// `self IN (subquery)`
    pub fn in_subquery(&self, query: SelectQuery) -> Filter {
        Filter::InSubquery(self.expr(), Box::new(query))
    }

    /// Ascending sort key.
    pub fn asc(&self) -> OrderByField {
        OrderByField::asc(self.column.clone())
    }

    /// Descending sort key.
    pub fn desc(&self) -> OrderByField {
        OrderByField::desc(self.column.clone())
    }

    /// `COUNT(self)`
    pub fn count(&self) -> Expr {
        self.expr().aggregate(AggregateFn::Count)
    }

    /// `COUNT(DISTINCT self)`
    pub fn count_distinct(&self) -> Expr {
        self.expr().aggregate(AggregateFn::CountDistinct)
    }

    /// `SUM(self)`
    pub fn sum(&self) -> Expr {
        self.expr().aggregate(AggregateFn::Sum)
    }

    /// `AVG(self)`
    pub fn avg(&self) -> Expr {
        self.expr().aggregate(AggregateFn::Avg)
    }

    /// `MIN(self)`
    pub fn min(&self) -> Expr {
        self.expr().aggregate(AggregateFn::Min)
    }

    /// `MAX(self)`
    pub fn max(&self) -> Expr {
        self.expr().aggregate(AggregateFn::Max)
    }

    /// Cast to text.
    pub fn string_value(&self) -> Expr {
        self.expr().string_value()
    }

    /// Concatenate with another expression.
    pub fn concat(&self, other: impl Into<Expr>) -> Expr {
        self.expr().concat(other)
    }

    /// Start a simple CASE over this column.
    pub fn when(&self, value: impl Into<CaseWhen>) -> CaseWhenBuilder {
        self.expr().when(value)
    }
}

impl<T: Into<FilterValue>> Path<T> {
    /// `self = value`
    pub fn eq(&self, value: impl Into<T>) -> Filter {
        Filter::Equals(self.column.clone(), value.into().into())
    }

    /// `self = value` when a value is present, no constraint otherwise.
    pub fn eq_opt<V: Into<T>>(&self, value: Option<V>) -> Option<Filter> {
        value.map(|v| self.eq(v))
    }

    /// `self <> value`
    pub fn ne(&self, value: impl Into<T>) -> Filter {
        Filter::NotEquals(self.column.clone(), value.into().into())
    }

    /// `self < value`
    pub fn lt(&self, value: impl Into<T>) -> Filter {
        Filter::Lt(self.column.clone(), value.into().into())
    }

    /// `self <= value`
    pub fn loe(&self, value: impl Into<T>) -> Filter {
        Filter::Lte(self.column.clone(), value.into().into())
    }

    /// `self <= value` when a value is present.
    pub fn loe_opt<V: Into<T>>(&self, value: Option<V>) -> Option<Filter> {
        value.map(|v| self.loe(v))
    }

    /// `self > value`
    pub fn gt(&self, value: impl Into<T>) -> Filter {
        Filter::Gt(self.column.clone(), value.into().into())
    }

    /// `self >= value`
    pub fn goe(&self, value: impl Into<T>) -> Filter {
        Filter::Gte(self.column.clone(), value.into().into())
    }

    /// `self >= value` when a value is present.
    pub fn goe_opt<V: Into<T>>(&self, value: Option<V>) -> Option<Filter> {
        value.map(|v| self.goe(v))
    }

    /// `self BETWEEN low AND high` (inclusive).
    pub fn between(&self, low: impl Into<T>, high: impl Into<T>) -> Filter {
        Filter::Between(
            self.column.clone(),
            low.into().into(),
            high.into().into(),
        )
    }

    /// `self IN (values...)`
    pub fn is_in(&self, values: impl IntoIterator<Item = T>) -> Filter {
        Filter::In(
            self.column.clone(),
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// `self NOT IN (values...)`
    pub fn not_in(&self, values: impl IntoIterator<Item = T>) -> Filter {
        Filter::NotIn(
            self.column.clone(),
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// `self + value`
    pub fn add(&self, value: impl Into<T>) -> Expr {
        self.expr().add(Expr::Value(value.into().into()))
    }
}

impl Path<String> {
    /// Substring match. Case-sensitive, and `%`, `_`, `*` and `?` in
    /// `value` match only themselves.
    pub fn contains(&self, value: impl Into<String>) -> Filter {
        Filter::Contains(self.column.clone(), FilterValue::String(value.into()))
    }

    /// Prefix match, with the same rules as [`Path::contains`].
    pub fn starts_with(&self, value: impl Into<String>) -> Filter {
        Filter::StartsWith(self.column.clone(), FilterValue::String(value.into()))
    }

    /// Suffix match, with the same rules as [`Path::contains`].
    pub fn ends_with(&self, value: impl Into<String>) -> Filter {
        Filter::EndsWith(self.column.clone(), FilterValue::String(value.into()))
    }

    /// `lower(self)`
    pub fn lower(&self) -> Expr {
        Expr::function("lower", [self.expr()])
    }

    /// `upper(self)`
    pub fn upper(&self) -> Expr {
        Expr::function("upper", [self.expr()])
    }
}

impl<T> Clone for Path<T> {
    fn clone(&self) -> Self {
        Self::from_column(self.column.clone())
    }
}

impl<T> fmt::Debug for Path<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Path").field(&self.column).finish()
    }
}

impl<T> fmt::Display for Path<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.column, f)
    }
}

impl<T> PartialEq for Path<T> {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column
    }
}

impl<T> From<Path<T>> for Column {
    fn from(path: Path<T>) -> Self {
        path.column
    }
}

impl<T> From<&Path<T>> for Column {
    fn from(path: &Path<T>) -> Self {
        path.column.clone()
    }
}

impl<T> From<Path<T>> for Expr {
    fn from(path: Path<T>) -> Self {
        Expr::Column(path.column)
    }
}

impl<T> From<&Path<T>> for Expr {
    fn from(path: &Path<T>) -> Self {
        path.expr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age() -> Path<i32> {
        Path::new("m", "age")
    }

    fn username() -> Path<String> {
        Path::new("m", "username")
    }

    #[test]
    fn test_eq() {
        assert_eq!(
            username().eq("member1"),
            Filter::Equals(Column::from("m.username"), "member1".into())
        );
    }

    #[test]
    fn test_opt_variants() {
        assert!(age().goe_opt(None::<i32>).is_none());
        assert_eq!(age().loe_opt(Some(40)), Some(age().loe(40)));
        assert_eq!(username().eq_opt(Some("a")), Some(username().eq("a")));
    }

    #[test]
    fn test_between_and_in() {
        let (sql, params) = Filter::and([age().between(10, 30), age().is_in([10, 20])]).to_sql();
        assert_eq!(
            sql,
            "(\"m\".\"age\" BETWEEN ?1 AND ?2 AND \"m\".\"age\" IN (?3, ?4))"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_ordering() {
        assert_eq!(age().desc().to_sql(), "\"m\".\"age\" DESC");
        assert_eq!(
            username().asc().nulls_last().to_sql(),
            "\"m\".\"username\" ASC NULLS LAST"
        );
    }

    #[test]
    fn test_eq_path() {
        let name: Path<String> = Path::new("t", "name");
        let (sql, _) = username().eq_path(&name).to_sql();
        assert_eq!(sql, "\"m\".\"username\" = \"t\".\"name\"");
    }

    #[test]
    fn test_lower() {
        let (sql, _) = username().lower().to_sql();
        assert_eq!(sql, "lower(\"m\".\"username\")");
    }

    #[test]
    fn test_debug_and_display() {
        assert_eq!(age().to_string(), "m.age");
        assert!(format!("{:?}", age()).starts_with("Path("));
    }
}
