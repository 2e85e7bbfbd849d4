//! Scalar expressions used in projections, comparisons and CASE branches.
//!
//! ```rust
//! use roster_query::{Column, Expr};
//!
//! // username || '_' || CAST(age AS TEXT)
//! let label = Expr::column(Column::from("m.username"))
//!     .concat("_")
//!     .concat(Expr::column(Column::from("m.age")).string_value());
//!
//! let (sql, params) = label.to_sql();
//! assert_eq!(sql, "(\"m\".\"username\" || ?1 || CAST(\"m\".\"age\" AS TEXT))");
//! assert_eq!(params.len(), 1);
//! ```

use std::borrow::Cow;

use crate::column::Column;
use crate::filter::{CompareOp, Filter, FilterValue};
use crate::query::SelectQuery;
use crate::sql::SqlWriter;

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    /// `COUNT(x)`
    Count,
    /// `COUNT(DISTINCT x)`
    CountDistinct,
    /// `SUM(x)`
    Sum,
    /// `AVG(x)`
    Avg,
    /// `MIN(x)`
    Min,
    /// `MAX(x)`
    Max,
}

impl AggregateFn {
    fn name(&self) -> &'static str {
        match self {
            Self::Count | Self::CountDistinct => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// A scalar SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference.
    Column(Column),
    /// Bound value.
    Value(FilterValue),
    /// `COUNT(*)`.
    CountAll,
    /// Aggregate over an expression.
    Aggregate(AggregateFn, Box<Expr>),
    /// String concatenation.
    Concat(Vec<Expr>),
    /// Cast to text.
    Text(Box<Expr>),
    /// Numeric addition.
    Add(Box<Expr>, Box<Expr>),
    /// Call to a function registered with the database (`lower`, `replace`, ...).
    Function(Cow<'static, str>, Vec<Expr>),
    /// CASE expression.
    Case(Box<CaseExpr>),
    /// Scalar subquery.
    Subquery(Box<SelectQuery>),
}

impl Expr {
    /// Column reference.
    pub fn column(column: impl Into<Column>) -> Self {
        Self::Column(column.into())
    }

    /// A constant, bound as a parameter.
    pub fn constant(value: impl Into<FilterValue>) -> Self {
        Self::Value(value.into())
    }

    /// A database function call.
    pub fn function(name: impl Into<Cow<'static, str>>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Function(name.into(), args.into_iter().collect())
    }

    /// A scalar subquery.
    pub fn subquery(query: SelectQuery) -> Self {
        Self::Subquery(Box::new(query))
    }

    /// Concatenate with another expression.
    pub fn concat(self, other: impl Into<Expr>) -> Self {
        match self {
            Self::Concat(mut parts) => {
                parts.push(other.into());
                Self::Concat(parts)
            }
            first => Self::Concat(vec![first, other.into()]),
        }
    }

    /// Cast this expression to text.
    pub fn string_value(self) -> Self {
        Self::Text(Box::new(self))
    }

    /// Add another expression.
    pub fn add(self, other: impl Into<Expr>) -> Self {
        Self::Add(Box::new(self), Box::new(other.into()))
    }

    /// Apply an aggregate function.
    pub fn aggregate(self, func: AggregateFn) -> Self {
        Self::Aggregate(func, Box::new(self))
    }

    /// `self = other`
    pub fn eq(self, other: impl Into<Expr>) -> Filter {
        Filter::Compare(self, CompareOp::Eq, other.into())
    }

    /// `self <> other`
    pub fn ne(self, other: impl Into<Expr>) -> Filter {
        Filter::Compare(self, CompareOp::Ne, other.into())
    }

    /// `self < other`
    pub fn lt(self, other: impl Into<Expr>) -> Filter {
        Filter::Compare(self, CompareOp::Lt, other.into())
    }

    /// `self <= other`
    pub fn loe(self, other: impl Into<Expr>) -> Filter {
        Filter::Compare(self, CompareOp::Lte, other.into())
    }

    /// `self > other`
    pub fn gt(self, other: impl Into<Expr>) -> Filter {
        Filter::Compare(self, CompareOp::Gt, other.into())
    }

    /// `self >= other`
    pub fn goe(self, other: impl Into<Expr>) -> Filter {
        Filter::Compare(self, CompareOp::Gte, other.into())
    }

    /// Start a simple CASE on this expression.
    pub fn when(self, value: impl Into<CaseWhen>) -> CaseWhenBuilder {
        CaseBuilder::simple(self).when(value)
    }

    /// Generate SQL for this expression.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let mut w = SqlWriter::new();
        self.write_sql(&mut w);
        w.finish()
    }

    /// Render into a shared writer.
    pub fn write_sql(&self, w: &mut SqlWriter) {
        match self {
            Self::Column(col) => col.write_sql(w),
            Self::Value(v) => w.bind(v.clone()),
            Self::CountAll => w.push("COUNT(*)"),
            Self::Aggregate(func, inner) => {
                w.push(func.name());
                w.push("(");
                if *func == AggregateFn::CountDistinct {
                    w.push("DISTINCT ");
                }
                inner.write_sql(w);
                w.push(")");
            }
            Self::Concat(parts) => {
                w.push("(");
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        w.push(" || ");
                    }
                    part.write_sql(w);
                }
                w.push(")");
            }
            Self::Text(inner) => {
                w.push("CAST(");
                inner.write_sql(w);
                w.push(" AS TEXT)");
            }
            Self::Add(left, right) => {
                w.push("(");
                left.write_sql(w);
                w.push(" + ");
                right.write_sql(w);
                w.push(")");
            }
            Self::Function(name, args) => {
                w.push(name);
                w.push("(");
                w.push_list(args, |w, a| a.write_sql(w));
                w.push(")");
            }
            Self::Case(case) => case.write_sql(w),
            Self::Subquery(query) => {
                w.push("(");
                query.write_sql(w);
                w.push(")");
            }
        }
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<FilterValue> for Expr {
    fn from(value: FilterValue) -> Self {
        Self::Value(value)
    }
}

impl From<SelectQuery> for Expr {
    fn from(query: SelectQuery) -> Self {
        Self::subquery(query)
    }
}

macro_rules! expr_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expr {
                fn from(v: $ty) -> Self {
                    Self::Value(v.into())
                }
            }

            impl From<$ty> for CaseWhen {
                fn from(v: $ty) -> Self {
                    Self::Value(Expr::Value(v.into()))
                }
            }
        )*
    };
}

expr_from_value!(bool, i32, i64, f64, String, &str);

/// The test of one CASE branch.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseWhen {
    /// Compared against the CASE operand (simple CASE).
    Value(Expr),
    /// Evaluated as a condition (searched CASE).
    Condition(Filter),
}

impl From<Filter> for CaseWhen {
    fn from(filter: Filter) -> Self {
        Self::Condition(filter)
    }
}

impl From<Expr> for CaseWhen {
    fn from(expr: Expr) -> Self {
        Self::Value(expr)
    }
}

/// A rendered CASE expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    operand: Option<Expr>,
    branches: Vec<(CaseWhen, Expr)>,
    otherwise: Option<Expr>,
}

impl CaseExpr {
    fn write_sql(&self, w: &mut SqlWriter) {
        w.push("CASE");
        if let Some(operand) = &self.operand {
            w.push(" ");
            operand.write_sql(w);
        }
        for (when, then) in &self.branches {
            w.push(" WHEN ");
            match when {
                CaseWhen::Value(v) => v.write_sql(w),
                CaseWhen::Condition(f) => f.write_sql(w),
            }
            w.push(" THEN ");
            then.write_sql(w);
        }
        if let Some(otherwise) = &self.otherwise {
            w.push(" ELSE ");
            otherwise.write_sql(w);
        }
        w.push(" END");
    }
}

/// Builder for CASE expressions.
///
/// ```rust
/// use roster_query::{CaseBuilder, Column, Filter};
///
/// let bucket = CaseBuilder::new()
///     .when(Filter::Between(Column::from("age"), 0.into(), 20.into()))
///     .then("0-20")
///     .otherwise("other");
///
/// let (sql, params) = bucket.to_sql();
/// assert_eq!(sql, "CASE WHEN \"age\" BETWEEN ?1 AND ?2 THEN ?3 ELSE ?4 END");
/// assert_eq!(params.len(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    operand: Option<Expr>,
    branches: Vec<(CaseWhen, Expr)>,
}

impl CaseBuilder {
    /// Start a searched CASE (`CASE WHEN cond THEN ...`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a simple CASE (`CASE operand WHEN value THEN ...`).
    pub fn simple(operand: impl Into<Expr>) -> Self {
        Self {
            operand: Some(operand.into()),
            branches: Vec::new(),
        }
    }

    /// Add a branch test.
    pub fn when(self, when: impl Into<CaseWhen>) -> CaseWhenBuilder {
        CaseWhenBuilder {
            builder: self,
            when: when.into(),
        }
    }

    /// Finish with an ELSE branch.
    pub fn otherwise(self, value: impl Into<Expr>) -> Expr {
        Expr::Case(Box::new(CaseExpr {
            operand: self.operand,
            branches: self.branches,
            otherwise: Some(value.into()),
        }))
    }

    /// Finish without an ELSE branch (unmatched rows yield NULL).
    pub fn end(self) -> Expr {
        Expr::Case(Box::new(CaseExpr {
            operand: self.operand,
            branches: self.branches,
            otherwise: None,
        }))
    }
}

/// A CASE branch awaiting its result.
#[derive(Debug, Clone)]
pub struct CaseWhenBuilder {
    builder: CaseBuilder,
    when: CaseWhen,
}

impl CaseWhenBuilder {
    /// Set the branch result.
    pub fn then(mut self, value: impl Into<Expr>) -> CaseBuilder {
        self.builder.branches.push((self.when, value.into()));
        self.builder
    }
}
