//! SQL text accumulation with positional parameter binding.
//!
//! Every builder in this crate renders into a [`SqlWriter`], so nested
//! fragments (subqueries inside filters, CASE branches inside projections)
//! share one parameter list and one placeholder sequence.

use std::fmt::Write;

use crate::filter::FilterValue;

/// Quote an identifier for SQLite, doubling embedded quotes.
///
/// ```rust
/// use roster_query::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("member"), "\"member\"");
/// assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    write_identifier(&mut quoted, name);
    quoted
}

fn write_identifier(buffer: &mut String, name: &str) {
    buffer.push('"');
    for c in name.chars() {
        if c == '"' {
            buffer.push('"');
        }
        buffer.push(c);
    }
    buffer.push('"');
}

/// Accumulates SQL text and the values bound to its placeholders.
///
/// Placeholders are numbered (`?1`, `?2`, ...) in the order values are bound.
///
/// ```rust
/// use roster_query::sql::SqlWriter;
///
/// let mut w = SqlWriter::new();
/// w.push("SELECT * FROM ");
/// w.push_identifier("member");
/// w.push(" WHERE ");
/// w.push_identifier("age");
/// w.push(" > ");
/// w.bind(18);
/// let (sql, params) = w.finish();
/// assert_eq!(sql, "SELECT * FROM \"member\" WHERE \"age\" > ?1");
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SqlWriter {
    sql: String,
    params: Vec<FilterValue>,
}

impl SqlWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            sql: String::with_capacity(128),
            params: Vec::new(),
        }
    }

    /// Append raw SQL text.
    #[inline]
    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append a quoted identifier.
    #[inline]
    pub fn push_identifier(&mut self, name: &str) {
        write_identifier(&mut self.sql, name);
    }

    /// Bind a value and append its placeholder.
    pub fn bind(&mut self, value: impl Into<FilterValue>) {
        self.params.push(value.into());
        let _ = write!(self.sql, "?{}", self.params.len());
    }

    /// Append a comma-separated list, rendering each item with `f`.
    pub fn push_list<T>(&mut self, items: &[T], mut f: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            f(self, item);
        }
    }

    /// The SQL rendered so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of values bound so far.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Consume the writer, returning the SQL and its parameters.
    pub fn finish(self) -> (String, Vec<FilterValue>) {
        (self.sql, self.params)
    }
}
