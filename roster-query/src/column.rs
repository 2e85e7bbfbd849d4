//! Column references, optionally qualified by a table alias.

use std::borrow::Cow;
use std::fmt;

use crate::sql::SqlWriter;

/// A reference to a column, e.g. `m.username`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Table alias the column belongs to (if qualified).
    pub table: Option<Cow<'static, str>>,
    /// Column name.
    pub name: Cow<'static, str>,
}

impl Column {
    /// Create an unqualified column.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    /// Create a column qualified by a table alias.
    pub fn qualified(table: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Parse `"alias.name"` or `"name"`.
    pub fn parse(path: &str) -> Self {
        match path.split_once('.') {
            Some((table, name)) => Self::qualified(table.to_string(), name.to_string()),
            None => Self::new(path.to_string()),
        }
    }

    /// Render the (possibly qualified) column.
    pub fn write_sql(&self, w: &mut SqlWriter) {
        if let Some(table) = &self.table {
            w.push_identifier(table);
            w.push(".");
        }
        w.push_identifier(&self.name);
    }

    /// Render only the column name (for `SET` targets and `INSERT` lists).
    pub fn write_unqualified(&self, w: &mut SqlWriter) {
        w.push_identifier(&self.name);
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&'static str> for Column {
    fn from(path: &'static str) -> Self {
        match path.split_once('.') {
            Some((table, name)) => Self::qualified(table, name),
            None => Self::new(path),
        }
    }
}

impl From<String> for Column {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_from_str() {
        let col = Column::from("m.username");
        assert_eq!(col.table.as_deref(), Some("m"));
        assert_eq!(col.name, "username");
        assert_eq!(col.to_string(), "m.username");
    }

    #[test]
    fn test_write_sql() {
        let mut w = SqlWriter::new();
        Column::qualified("t", "name").write_sql(&mut w);
        w.push(" ");
        Column::qualified("t", "name").write_unqualified(&mut w);
        assert_eq!(w.sql(), "\"t\".\"name\" \"name\"");
    }
}
