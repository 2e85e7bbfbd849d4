//! Filter types for building WHERE, ON and HAVING clauses.

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::expr::Expr;
use crate::query::SelectQuery;
use crate::sql::SqlWriter;

/// A literal bound into a statement as a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// SQL NULL.
    Null,
    /// Stored by SQLite as 0 or 1.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// Double.
    Float(f64),
    /// Text.
    String(String),
    /// Bound as its JSON text.
    Json(serde_json::Value),
}

impl FilterValue {
    /// True for [`FilterValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! filter_value_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v $(as $cast)?)
                }
            }
        )*
    };
}

filter_value_from! {
    bool => Bool,
    i32 => Int as i64,
    i64 => Int,
    f64 => Float,
    String => String,
    serde_json::Value => Json,
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Comparison operators between two expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
}

impl CompareOp {
    /// Operator text.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

/// A boolean condition over rows.
///
/// [`Filter::None`] is the absent condition: it disappears from `and`/`or`
/// and a query holding it renders no `WHERE` clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// No constraint.
    #[default]
    None,

    /// `col = v`, or `IS NULL` for a null value.
    Equals(Column, FilterValue),
    /// `col <> v`, or `IS NOT NULL` for a null value.
    NotEquals(Column, FilterValue),

    /// `col < v`
    Lt(Column, FilterValue),
    /// `col <= v`
    Lte(Column, FilterValue),
    /// `col > v`
    Gt(Column, FilterValue),
    /// `col >= v`
    Gte(Column, FilterValue),
    /// `col BETWEEN low AND high`
    Between(Column, FilterValue, FilterValue),

    /// `col IN (...)`; an empty list matches nothing.
    In(Column, Vec<FilterValue>),
    /// `col NOT IN (...)`; an empty list matches everything.
    NotIn(Column, Vec<FilterValue>),

    /// Case-sensitive substring match; the value is taken literally.
    Contains(Column, FilterValue),
    /// Case-sensitive prefix match.
    StartsWith(Column, FilterValue),
    /// Case-sensitive suffix match.
    EndsWith(Column, FilterValue),

    /// `col IS NULL`
    IsNull(Column),
    /// `col IS NOT NULL`
    IsNotNull(Column),

    /// Comparison between two arbitrary expressions
    /// (column to column, column to scalar subquery, ...).
    Compare(Expr, CompareOp, Expr),
    /// Membership in the rows produced by a subquery.
    InSubquery(Expr, Box<SelectQuery>),

    /// Every member holds.
    And(Vec<Filter>),
    /// Some member holds.
    Or(Vec<Filter>),
    /// Negation.
    Not(Box<Filter>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Junction {
    And,
    Or,
}

impl Filter {
    /// The absent condition.
    pub fn none() -> Self {
        Self::None
    }

    /// True for the absent condition.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create an AND filter, dropping empty members.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.swap_remove(0),
            _ => Self::And(filters),
        }
    }

    /// Create an OR filter, dropping empty members.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.swap_remove(0),
            _ => Self::Or(filters),
        }
    }

    /// Negate `filter`. Negating the absent condition leaves it absent.
    pub fn not(filter: Filter) -> Self {
        if filter.is_none() {
            return Self::None;
        }
        Self::Not(Box::new(filter))
    }

    /// `self AND other`. Absent sides drop out; an existing `And` is
    /// extended rather than nested.
    pub fn and_then(self, other: Filter) -> Self {
        self.join(other, Junction::And)
    }

    /// `self OR other`, with the same absorption rules as [`Filter::and_then`].
    pub fn or_else(self, other: Filter) -> Self {
        self.join(other, Junction::Or)
    }

    fn join(self, other: Filter, junction: Junction) -> Self {
        match (self, other) {
            (Self::None, rhs) => rhs,
            (lhs, Self::None) => lhs,
            (Self::And(mut list), rhs) if junction == Junction::And => {
                list.push(rhs);
                Self::And(list)
            }
            (Self::Or(mut list), rhs) if junction == Junction::Or => {
                list.push(rhs);
                Self::Or(list)
            }
            (lhs, rhs) => match junction {
                Junction::And => Self::And(vec![lhs, rhs]),
                Junction::Or => Self::Or(vec![lhs, rhs]),
            },
        }
    }

    /// Number of leaf conditions in this filter.
    pub fn condition_count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::And(filters) | Self::Or(filters) => {
                filters.iter().map(Filter::condition_count).sum()
            }
            Self::Not(inner) => inner.condition_count(),
            _ => 1,
        }
    }

    /// Standalone rendering: the condition text and its bind values, in
    /// placeholder order.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let mut w = SqlWriter::new();
        self.write_sql(&mut w);
        w.finish()
    }

    /// Render into `w`, continuing its placeholder numbering.
    pub fn write_sql(&self, w: &mut SqlWriter) {
        match self {
            Self::None => w.push("1 = 1"),

            Self::Equals(col, val) => {
                col.write_sql(w);
                if val.is_null() {
                    w.push(" IS NULL");
                } else {
                    w.push(" = ");
                    w.bind(val.clone());
                }
            }
            Self::NotEquals(col, val) => {
                col.write_sql(w);
                if val.is_null() {
                    w.push(" IS NOT NULL");
                } else {
                    w.push(" <> ");
                    w.bind(val.clone());
                }
            }

            Self::Lt(col, val) => write_binary(w, col, "<", val),
            Self::Lte(col, val) => write_binary(w, col, "<=", val),
            Self::Gt(col, val) => write_binary(w, col, ">", val),
            Self::Gte(col, val) => write_binary(w, col, ">=", val),
            Self::Between(col, low, high) => {
                col.write_sql(w);
                w.push(" BETWEEN ");
                w.bind(low.clone());
                w.push(" AND ");
                w.bind(high.clone());
            }

            Self::In(col, values) => {
                if values.is_empty() {
                    w.push("1 = 0");
                    return;
                }
                col.write_sql(w);
                w.push(" IN (");
                w.push_list(values, |w, v| w.bind(v.clone()));
                w.push(")");
            }
            Self::NotIn(col, values) => {
                if values.is_empty() {
                    w.push("1 = 1");
                    return;
                }
                col.write_sql(w);
                w.push(" NOT IN (");
                w.push_list(values, |w, v| w.bind(v.clone()));
                w.push(")");
            }

            Self::Contains(col, val) => write_like(w, col, val, "*", "*"),
            Self::StartsWith(col, val) => write_like(w, col, val, "", "*"),
            Self::EndsWith(col, val) => write_like(w, col, val, "*", ""),

            Self::IsNull(col) => {
                col.write_sql(w);
                w.push(" IS NULL");
            }
            Self::IsNotNull(col) => {
                col.write_sql(w);
                w.push(" IS NOT NULL");
            }

            Self::Compare(left, op, right) => {
                left.write_sql(w);
                w.push(" ");
                w.push(op.as_sql());
                w.push(" ");
                right.write_sql(w);
            }
            Self::InSubquery(expr, query) => {
                expr.write_sql(w);
                w.push(" IN (");
                query.write_sql(w);
                w.push(")");
            }

            Self::And(filters) => write_group(w, filters, " AND ", "1 = 1"),
            Self::Or(filters) => write_group(w, filters, " OR ", "1 = 0"),
            Self::Not(filter) => {
                w.push("NOT (");
                filter.write_sql(w);
                w.push(")");
            }
        }
    }
}

fn write_binary(w: &mut SqlWriter, col: &Column, op: &str, val: &FilterValue) {
    col.write_sql(w);
    w.push(" ");
    w.push(op);
    w.push(" ");
    w.bind(val.clone());
}

fn write_like(w: &mut SqlWriter, col: &Column, val: &FilterValue, prefix: &str, suffix: &str) {
    col.write_sql(w);
    w.push(" GLOB ");
    match val {
        FilterValue::String(s) => w.bind(format!("{}{}{}", prefix, escape_glob(s), suffix)),
        other => w.bind(other.clone()),
    }
}

/// Make `*`, `?` and `[` match themselves in a GLOB pattern.
fn escape_glob(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' | '?' | '[' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            c => out.push(c),
        }
    }
    out
}

fn write_group(w: &mut SqlWriter, filters: &[Filter], joiner: &str, empty: &str) {
    if filters.is_empty() {
        w.push(empty);
        return;
    }
    w.push("(");
    for (i, f) in filters.iter().enumerate() {
        if i > 0 {
            w.push(joiner);
        }
        f.write_sql(w);
    }
    w.push(")");
}
