//! Dynamic predicate composition.
//!
//! Each optional search field becomes an `Option<Filter>`: present values
//! produce a constraint, absent values produce none. [`combine`] folds the
//! sequence into one conjunctive filter.
//!
//! ```rust
//! use roster_query::{combine, predicate_for, Filter, Path};
//!
//! let username: Path<String> = Path::new("m", "username");
//! let age: Path<i32> = Path::new("m", "age");
//!
//! let filter = combine([
//!     predicate_for(Some("member1"), &username),
//!     predicate_for(None::<i32>, &age),
//! ]);
//! assert_eq!(filter, username.eq("member1"));
//!
//! // Nothing present: match everything
//! assert_eq!(combine([predicate_for(None::<i32>, &age)]), Filter::None);
//! ```

use crate::filter::{Filter, FilterValue};
use crate::path::Path;

/// Equality constraint on `path` if `value` is present.
pub fn predicate_for<T, V>(value: Option<V>, path: &Path<T>) -> Option<Filter>
where
    T: Into<FilterValue>,
    V: Into<T>,
{
    path.eq_opt(value)
}

/// Conjoin the present constraints, left to right.
///
/// Returns `Filter::None` (match all) when no constraint is present.
pub fn combine(constraints: impl IntoIterator<Item = Option<Filter>>) -> Filter {
    constraints
        .into_iter()
        .flatten()
        .fold(Filter::None, Filter::and_then)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn username() -> Path<String> {
        Path::new("m", "username")
    }

    fn age() -> Path<i32> {
        Path::new("m", "age")
    }

    #[test]
    fn test_predicate_for_absent() {
        assert_eq!(predicate_for(None::<String>, &username()), None);
    }

    #[test]
    fn test_predicate_for_present() {
        assert_eq!(
            predicate_for(Some(10), &age()),
            Some(Filter::Equals(age().column().clone(), FilterValue::Int(10)))
        );
    }

    #[test]
    fn test_combine_empty_is_match_all() {
        assert_eq!(combine(Vec::new()), Filter::None);
        assert_eq!(combine([None, None, None]), Filter::None);
    }

    #[test]
    fn test_combine_skips_absent() {
        let filter = combine([
            None,
            predicate_for(Some("member1"), &username()),
            None,
            age().goe_opt(Some(10)),
        ]);
        assert_eq!(
            filter,
            Filter::And(vec![username().eq("member1"), age().goe(10)])
        );
    }

    #[test]
    fn test_combine_single_is_unwrapped() {
        let filter = combine([None, age().loe_opt(Some(40))]);
        assert_eq!(filter, age().loe(40));
    }

    #[test]
    fn test_combine_preserves_order() {
        let a = username().eq("member1");
        let b = age().goe(10);
        let forward = combine([Some(a.clone()), Some(b.clone())]);
        let backward = combine([Some(b.clone()), Some(a.clone())]);
        assert_eq!(forward, Filter::And(vec![a.clone(), b.clone()]));
        assert_eq!(backward, Filter::And(vec![b, a]));
        assert_eq!(forward.condition_count(), backward.condition_count());
    }
}
