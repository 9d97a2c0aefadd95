//! Error types for the query crate.

use std::fmt;

use thiserror::Error;

/// Errors raised while a query is being evaluated.
///
/// Every variant is raised at the point of detection during a traversal and
/// aborts it. Nothing is retried or coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A callback used as a predicate returned something other than a bool.
    #[error("predicate must return bool, got {actual} for key {key} at position {position}")]
    PredicateType {
        actual: &'static str,
        key: String,
        position: usize,
    },

    /// A `map` or `filter` stage yielded a key it had already yielded.
    #[error("duplicate key {key} at position {position}")]
    KeyDuplicate { key: String, position: usize },

    /// A required-result evaluator found no qualifying element.
    #[error("sequence contains no matching element")]
    NoValue,

    /// `single` found more than one qualifying element.
    #[error("sequence contains more than one matching element ({count} matches)")]
    TooManyValues { count: usize },
}

impl QueryError {
    /// Create a predicate type error for the given key.
    pub fn predicate_type(actual: &'static str, key: &impl fmt::Debug, position: usize) -> Self {
        Self::PredicateType {
            actual,
            key: format!("{key:?}"),
            position,
        }
    }

    /// Create a duplicate key error for the given key.
    pub fn key_duplicate(key: &impl fmt::Debug, position: usize) -> Self {
        Self::KeyDuplicate {
            key: format!("{key:?}"),
            position,
        }
    }

    /// Returns `true` if this is a [`QueryError::PredicateType`].
    pub fn is_predicate_type(&self) -> bool {
        matches!(self, QueryError::PredicateType { .. })
    }

    /// Returns `true` if this is a [`QueryError::KeyDuplicate`].
    pub fn is_key_duplicate(&self) -> bool {
        matches!(self, QueryError::KeyDuplicate { .. })
    }

    /// Returns `true` if this is a [`QueryError::NoValue`].
    pub fn is_no_value(&self) -> bool {
        matches!(self, QueryError::NoValue)
    }

    /// Returns `true` if this is a [`QueryError::TooManyValues`].
    pub fn is_too_many_values(&self) -> bool {
        matches!(self, QueryError::TooManyValues { .. })
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
