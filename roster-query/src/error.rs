//! Errors raised while building, running and decoding queries.
//!
//! A [`QueryError`] pairs a stable [`ErrorCode`] with a message and an
//! [`ErrorContext`]. Codes render as `R` followed by four digits; the first
//! digit is the category:
//!
//! | Range | Category |
//! |-------|----------|
//! | 1xxx  | request (not found, not unique, bad page) |
//! | 3xxx  | data source reachability |
//! | 5xxx  | statement execution |
//! | 6xxx  | result decoding |
//! | 7xxx  | configuration |
//! | 9xxx  | internal |
//!
//! ```rust
//! use roster_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::invalid_page_request(-1, 10);
//! assert_eq!(err.code, ErrorCode::InvalidPageRequest);
//! assert_eq!(err.to_string(), "[R1006] offset must be >= 0 and limit > 0 (got offset -1, limit 10)");
//! ```

use std::fmt::{self, Write as _};
use thiserror::Error;

/// Result alias used throughout the query crates.
pub type QueryResult<T> = Result<T, QueryError>;

/// Stable, matchable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// No row matched a query that required one.
    RecordNotFound = 1001,
    /// Several rows matched a query that allowed one.
    NotUnique = 1002,
    /// Negative offset or non-positive limit.
    InvalidPageRequest = 1006,
    /// The store is closed, missing or locked.
    DataSourceUnavailable = 3001,
    /// The database rejected the SQL text.
    SqlSyntax = 5002,
    /// Any other failure reported by the database.
    DatabaseError = 5005,
    /// A row did not fit the requested type.
    DeserializationError = 6003,
    /// Settings could not be used.
    InvalidConfiguration = 7001,
    /// A broken assumption inside the library.
    Internal = 9001,
}

impl ErrorCode {
    /// The code as text, e.g. `R3001`.
    pub fn code(&self) -> String {
        format!("R{}", *self as u16)
    }

    /// One-line summary of what the code means.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RecordNotFound => "record not found",
            Self::NotUnique => "more than one record",
            Self::InvalidPageRequest => "invalid page request",
            Self::DataSourceUnavailable => "data source unavailable",
            Self::SqlSyntax => "malformed SQL",
            Self::DatabaseError => "database failure",
            Self::DeserializationError => "row decoding failed",
            Self::InvalidConfiguration => "invalid configuration",
            Self::Internal => "internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", *self as u16)
    }
}

/// What was going on when an error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation in progress.
    pub operation: Option<String>,
    /// The entity or table involved.
    pub model: Option<String>,
    /// The column involved.
    pub field: Option<String>,
    /// The statement being run.
    pub sql: Option<String>,
    /// Things the caller could try.
    pub suggestions: Vec<String>,
    /// Extra explanation.
    pub help: Option<String>,
}

/// An error from query building, execution or decoding.
#[derive(Error, Debug)]
#[error("[{code}] {message}")]
pub struct QueryError {
    /// Matchable code.
    pub code: ErrorCode,
    /// Human readable message.
    pub message: String,
    /// Surrounding context.
    pub context: ErrorContext,
    /// Underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl QueryError {
    /// An error with no context.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Record the operation in progress.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Record the entity or table involved.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Record the column involved.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Record the statement being run.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Add a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Attach help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Attach the underlying cause.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// No row matched.
    pub fn not_found(what: impl Into<String>) -> Self {
        let what = what.into();
        Self::new(ErrorCode::RecordNotFound, format!("no {} matched", what))
            .with_model(what)
            .with_suggestion("fetch an Option instead when absence is expected")
    }

    /// More than one row matched.
    pub fn not_unique(what: impl Into<String>, found: usize) -> Self {
        let what = what.into();
        Self::new(
            ErrorCode::NotUnique,
            format!("expected one {}, found {}", what, found),
        )
        .with_model(what)
        .with_suggestion("narrow the filter or take the first row")
    }

    /// Offset below zero or limit not positive.
    pub fn invalid_page_request(offset: i64, limit: i64) -> Self {
        Self::new(
            ErrorCode::InvalidPageRequest,
            format!(
                "offset must be >= 0 and limit > 0 (got offset {}, limit {})",
                offset, limit
            ),
        )
    }

    /// The store cannot be reached. Never retried here.
    pub fn data_source_unavailable(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DataSourceUnavailable,
            format!("data source unavailable: {}", reason.into()),
        )
    }

    /// The database rejected `sql`.
    pub fn sql_syntax(reason: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(ErrorCode::SqlSyntax, reason).with_sql(sql)
    }

    /// A row did not fit the target type.
    pub fn deserialization(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::DeserializationError, reason)
            .with_suggestion("select columns under the target's field names")
    }

    /// Any other database failure.
    pub fn database(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, reason)
    }

    /// Unusable settings.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, reason)
    }

    /// Broken internal assumption.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, reason)
    }

    /// `RecordNotFound`
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// `InvalidPageRequest`
    pub fn is_invalid_page_request(&self) -> bool {
        self.code == ErrorCode::InvalidPageRequest
    }

    /// `DataSourceUnavailable`
    pub fn is_unavailable(&self) -> bool {
        self.code == ErrorCode::DataSourceUnavailable
    }

    /// Multi-line rendering with every piece of context.
    pub fn report(&self) -> String {
        let mut out = format!("{} ({})", self, self.code.description());
        let ctx = &self.context;
        let labelled = [
            ("operation", &ctx.operation),
            ("model", &ctx.model),
            ("field", &ctx.field),
            ("sql", &ctx.sql),
        ];
        for (label, value) in labelled {
            if let Some(value) = value {
                let _ = write!(out, "\n  {}: {}", label, value);
            }
        }
        for suggestion in &ctx.suggestions {
            let _ = write!(out, "\n  try: {}", suggestion);
        }
        if let Some(help) = &ctx.help {
            let _ = write!(out, "\n  help: {}", help);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_text() {
        assert_eq!(ErrorCode::RecordNotFound.code(), "R1001");
        assert_eq!(ErrorCode::InvalidPageRequest.to_string(), "R1006");
        assert_eq!(ErrorCode::DataSourceUnavailable.code(), "R3001");
    }

    #[test]
    fn test_invalid_page_request() {
        let err = QueryError::invalid_page_request(0, 0);
        assert!(err.is_invalid_page_request());
        assert!(err.message.contains("limit 0"));
    }

    #[test]
    fn test_data_source_unavailable() {
        let err = QueryError::data_source_unavailable("connection closed");
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "[R3001] data source unavailable: connection closed");
    }

    #[test]
    fn test_not_unique_records_count() {
        let err = QueryError::not_unique("row", 3);
        assert_eq!(err.code, ErrorCode::NotUnique);
        assert_eq!(err.context.model.as_deref(), Some("row"));
        assert!(err.message.ends_with("found 3"));
    }

    #[test]
    fn test_report() {
        let err = QueryError::sql_syntax("near \"FROM\": syntax error", "SELECT FROM member")
            .with_operation("fetch members");

        let report = err.report();
        assert!(report.starts_with("[R5002]"));
        assert!(report.contains("operation: fetch members"));
        assert!(report.contains("sql: SELECT FROM member"));
    }

    #[test]
    fn test_source_is_kept() {
        let io = std::io::Error::other("boom");
        let err = QueryError::database("write failed").with_source(io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
