//! Sort keys for ORDER BY clauses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::column::Column;
use crate::sql::SqlWriter;

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// `ASC` or `DESC`.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Where NULLs go within one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullsOrder {
    /// Before every value.
    First,
    /// After every value.
    Last,
}

impl NullsOrder {
    /// `NULLS FIRST` or `NULLS LAST`.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// One sort key.
///
/// Without an explicit [`NullsOrder`] the database decides; SQLite treats
/// NULL as the smallest value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    /// Sorted column.
    pub column: Column,
    /// Direction.
    pub order: SortOrder,
    /// NULL placement; `None` leaves it to the database.
    pub nulls: Option<NullsOrder>,
}

impl OrderByField {
    /// A key on `column` in direction `order`.
    pub fn new(column: impl Into<Column>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
            nulls: None,
        }
    }

    /// Choose NULL placement.
    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Put nulls first.
    pub fn nulls_first(self) -> Self {
        self.nulls(NullsOrder::First)
    }

    /// Put nulls last.
    pub fn nulls_last(self) -> Self {
        self.nulls(NullsOrder::Last)
    }

    /// Ascending key.
    pub fn asc(column: impl Into<Column>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    /// Descending key.
    pub fn desc(column: impl Into<Column>) -> Self {
        Self::new(column, SortOrder::Desc)
    }

    /// Render into a shared writer.
    #[inline]
    pub fn write_sql(&self, w: &mut SqlWriter) {
        self.column.write_sql(w);
        w.push(" ");
        w.push(self.order.as_sql());
        if let Some(nulls) = self.nulls {
            w.push(" ");
            w.push(nulls.as_sql());
        }
    }

    /// Render on its own.
    pub fn to_sql(&self) -> String {
        let mut w = SqlWriter::new();
        self.write_sql(&mut w);
        w.finish().0
    }
}

/// Ordered list of sort keys; earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderBy {
    fields: Vec<OrderByField>,
}

impl OrderBy {
    /// No sort keys; rows come back in storage order.
    pub fn none() -> Self {
        Self::default()
    }

    /// True when there are no keys.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a lower-precedence key.
    pub fn then(mut self, field: OrderByField) -> Self {
        self.fields.push(field);
        self
    }

    /// Collect keys in precedence order.
    pub fn from_fields(fields: impl IntoIterator<Item = OrderByField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// The sort keys in precedence order.
    pub fn fields(&self) -> &[OrderByField] {
        &self.fields
    }

    /// How many keys.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Render the key list (without the `ORDER BY` keyword).
    pub fn write_sql(&self, w: &mut SqlWriter) {
        w.push_list(&self.fields, |w, f| f.write_sql(w));
    }

    /// Rendered key list.
    pub fn to_sql(&self) -> String {
        let mut w = SqlWriter::new();
        self.write_sql(&mut w);
        w.finish().0
    }
}

impl From<OrderByField> for OrderBy {
    fn from(field: OrderByField) -> Self {
        Self { fields: vec![field] }
    }
}

impl From<Vec<OrderByField>> for OrderBy {
    fn from(fields: Vec<OrderByField>) -> Self {
        Self { fields }
    }
}

impl<const N: usize> From<[OrderByField; N]> for OrderBy {
    fn from(fields: [OrderByField; N]) -> Self {
        Self::from_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_order_by_field() {
        let field = OrderByField::desc("m.age");
        assert_eq!(field.to_sql(), "\"m\".\"age\" DESC");

        let field_with_nulls = OrderByField::asc("username").nulls_last();
        assert_eq!(field_with_nulls.to_sql(), "\"username\" ASC NULLS LAST");
    }

    #[test]
    fn test_order_by_multiple() {
        let order = OrderBy::from(OrderByField::desc("age")).then(OrderByField::asc("username"));
        assert_eq!(order.to_sql(), "\"age\" DESC, \"username\" ASC");
        assert_eq!(order.field_count(), 2);
    }

    #[test]
    fn test_order_by_from_array() {
        let order: OrderBy = [OrderByField::asc("id")].into();
        assert!(!order.is_empty());
        assert!(OrderBy::none().is_empty());
    }
}
