//! Enforcement of the boolean return contract for predicates.

use std::fmt;

use tracing::debug;

use crate::entry::Entry;
use crate::error::{QueryError, Result};
use crate::value::Value;

/// Checks that a callback result is exactly a boolean.
///
/// Anything else, including numbers and strings that other languages would
/// treat as truthy, is a [`QueryError::PredicateType`].
pub(crate) fn expect_bool<K>(outcome: impl Into<Value>, key: &K, position: usize) -> Result<bool>
where
    K: fmt::Debug,
{
    let outcome = outcome.into();
    match outcome.as_bool() {
        Some(b) => Ok(b),
        None => {
            let actual = outcome.type_name();
            debug!(?key, position, actual, "predicate returned a non-bool");
            Err(QueryError::predicate_type(actual, key, position))
        }
    }
}

/// Runs a terminal predicate against an entry and checks its result.
pub(crate) fn test<K, V, R, F>(
    predicate: &mut F,
    entry: &Entry<K, V>,
    position: usize,
) -> Result<bool>
where
    K: fmt::Debug,
    R: Into<Value>,
    F: FnMut(&V, &K) -> R,
{
    expect_bool(predicate(&entry.value, &entry.key), &entry.key, position)
}
