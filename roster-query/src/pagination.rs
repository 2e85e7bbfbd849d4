//! Offset pagination and result pages.
//!
//! [`PageRequest`] is what callers hand in; it is validated into a
//! [`Pagination`] (the LIMIT/OFFSET clause) before anything reaches the
//! data source. Results come back as a [`Page`].
//!
//! ```rust
//! use roster_query::{PageRequest, Pagination};
//!
//! let pagination = PageRequest::new(1, 2).validate().unwrap();
//! assert_eq!(pagination.to_sql(), "LIMIT 2 OFFSET 1");
//!
//! // Zero-based page 2 with 25 items per page
//! let request = PageRequest::of(2, 25);
//! assert_eq!(request.offset, 50);
//!
//! assert!(PageRequest::new(0, 0).validate().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::error::{QueryError, QueryResult};

/// LIMIT/OFFSET configuration for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Number of records to skip.
    pub skip: Option<u64>,
    /// Maximum number of records to take.
    pub take: Option<u64>,
}

impl Pagination {
    /// Create a new pagination with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of records to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the maximum number of records to take.
    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    /// Check if pagination is specified.
    pub fn is_empty(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }

    /// Generate the SQL LIMIT/OFFSET clause.
    ///
    /// SQLite only accepts OFFSET after a LIMIT, so a bare skip renders
    /// as `LIMIT -1 OFFSET n`.
    pub fn to_sql(&self) -> String {
        let mut sql = String::with_capacity(32);
        match (self.take, self.skip) {
            (Some(take), Some(skip)) => {
                let _ = write!(sql, "LIMIT {} OFFSET {}", take, skip);
            }
            (Some(take), None) => {
                let _ = write!(sql, "LIMIT {}", take);
            }
            (None, Some(skip)) => {
                let _ = write!(sql, "LIMIT -1 OFFSET {}", skip);
            }
            (None, None) => {}
        }
        sql
    }

    /// Get pagination for the first N records.
    pub fn first(n: u64) -> Self {
        Self::new().take(n)
    }
}

/// A caller-supplied page request. Validated on use, not on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of matching records to skip.
    pub offset: i64,
    /// Maximum number of records to return.
    pub limit: i64,
}

impl PageRequest {
    /// Create a page request from a raw offset and limit.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Create a page request from a zero-based page number and page size.
    pub fn of(page: i64, size: i64) -> Self {
        Self {
            offset: page.saturating_mul(size),
            limit: size,
        }
    }

    /// Check the request, producing the LIMIT/OFFSET clause.
    ///
    /// Fails with `InvalidPageRequest` when offset < 0 or limit <= 0.
    pub fn validate(&self) -> QueryResult<Pagination> {
        if self.offset < 0 || self.limit <= 0 {
            return Err(QueryError::invalid_page_request(self.offset, self.limit));
        }
        Ok(Pagination::new()
            .skip(self.offset as u64)
            .take(self.limit as u64))
    }
}

/// How the total count of a page is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStrategy {
    /// Always issue a separate count query next to the bounded fetch.
    #[default]
    Always,
    /// Skip the count query when the fetched slice already determines the
    /// total: a first page shorter than the limit, or a non-empty last page.
    Lazy,
}

impl CountStrategy {
    /// The total implied by a fetched slice, if the slice alone proves it.
    pub fn known_total(&self, offset: u64, limit: u64, fetched: usize) -> Option<u64> {
        match self {
            Self::Always => None,
            Self::Lazy => {
                let fetched = fetched as u64;
                if fetched >= limit {
                    return None;
                }
                if offset == 0 || fetched > 0 {
                    Some(offset + fetched)
                } else {
                    None
                }
            }
        }
    }
}

/// A bounded slice of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    content: Vec<T>,
    total: u64,
    offset: u64,
    limit: u64,
}

impl<T> Page<T> {
    /// Assemble a page.
    pub fn new(content: Vec<T>, total: u64, offset: u64, limit: u64) -> Self {
        Self {
            content,
            total,
            offset,
            limit,
        }
    }

    /// The records in this page.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Take the records out of the page.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Total number of matching records ignoring offset and limit.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Offset this page starts at.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Requested page size.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records in this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Zero-based page number.
    pub fn number(&self) -> u64 {
        self.offset / self.limit.max(1)
    }

    /// Number of pages needed to hold every match.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit.max(1))
    }

    /// Whether records exist after this page.
    pub fn has_next(&self) -> bool {
        self.offset + (self.content.len() as u64) < self.total
    }

    /// Map the records, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }
}
