//! # roster-query
//!
//! Engine-agnostic query building and dynamic search for Roster.
//!
//! This crate provides:
//! - Typed column paths and scalar expressions (aggregates, CASE, subqueries)
//! - Filters for WHERE, ON and HAVING clauses
//! - SELECT / UPDATE / DELETE / INSERT builders rendering SQLite SQL
//! - Dynamic predicate composition from optional search fields
//! - A paged search executor over an async [`DataSource`]
//!
//! ## Filters
//!
//! ```rust
//! use roster_query::{Filter, FilterValue};
//!
//! let adult = Filter::Gte("age".into(), FilterValue::Int(18));
//! let named = Filter::Equals("username".into(), "member1".into());
//!
//! let both = Filter::and([adult, named]);
//! assert_eq!(both.condition_count(), 2);
//! ```
//!
//! ## Dynamic predicates
//!
//! Absent search fields contribute nothing; nothing present matches all.
//!
//! ```rust
//! use roster_query::{combine, Filter, Path};
//!
//! let username: Path<String> = Path::new("m", "username");
//! let age: Path<i32> = Path::new("m", "age");
//!
//! let age_goe: Option<i32> = Some(20);
//! let age_loe: Option<i32> = None;
//!
//! let filter = combine([
//!     username.eq_opt(None::<String>),
//!     age.goe_opt(age_goe),
//!     age.loe_opt(age_loe),
//! ]);
//! assert_eq!(filter, age.goe(20));
//! assert_eq!(combine([username.eq_opt(None::<String>)]), Filter::None);
//! ```
//!
//! ## Paging
//!
//! ```rust
//! use roster_query::{ErrorCode, PageRequest};
//!
//! let err = PageRequest::new(0, 0).validate().unwrap_err();
//! assert_eq!(err.code, ErrorCode::InvalidPageRequest);
//! ```

pub mod column;
pub mod error;
pub mod expr;
pub mod filter;
pub mod logging;
pub mod pagination;
pub mod path;
pub mod predicate;
pub mod query;
pub mod search;
pub mod sql;
pub mod types;

pub use column::Column;
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use expr::{AggregateFn, CaseBuilder, CaseWhen, CaseWhenBuilder, Expr};
pub use filter::{CompareOp, Filter, FilterValue};
pub use pagination::{CountStrategy, Page, PageRequest, Pagination};
pub use path::Path;
pub use predicate::{combine, predicate_for};
pub use query::{
    DeleteQuery, InsertQuery, Join, JoinKind, SelectItem, SelectQuery, TableRef, TableSource,
    UpdateQuery,
};
pub use search::{DataSource, SearchCondition, SearchExecutor};
pub use types::{NullsOrder, OrderBy, OrderByField, SortOrder};

// Re-export logging utilities
pub use logging::{init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::column::Column;
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::expr::{CaseBuilder, Expr};
    pub use crate::filter::{Filter, FilterValue};
    pub use crate::pagination::{CountStrategy, Page, PageRequest};
    pub use crate::path::Path;
    pub use crate::predicate::{combine, predicate_for};
    pub use crate::query::{DeleteQuery, InsertQuery, SelectQuery, TableRef, UpdateQuery};
    pub use crate::search::{DataSource, SearchCondition, SearchExecutor};
    pub use crate::types::{NullsOrder, OrderBy, OrderByField, SortOrder};
}
