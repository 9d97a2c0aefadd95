//! Terminal evaluators.
//!
//! Every method here opens a fresh traversal of the query. Evaluators that
//! must see the whole sequence (`to_list`, `count`, `last`, `single`) drain it;
//! `first`, `any` and `all_where` stop pulling as soon as the answer is known.
//!
//! Predicate-taking variants accept any callback returning `impl Into<Value>`
//! and fail with [`QueryError::PredicateType`] unless it returns a bool.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use tracing::trace;

use crate::entry::Entry;
use crate::error::{QueryError, Result};
use crate::predicate;
use crate::query::{Iter, Query};
use crate::value::Value;

impl<'a, K, V> Query<'a, K, V>
where
    K: fmt::Debug + 'a,
    V: 'a,
{
    fn traverse(&self, operation: &'static str) -> Iter<'_, K, V> {
        trace!(operation, "evaluating query");
        self.iter()
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Drains the query into a key → value map, in traversal order.
    ///
    /// If the source itself repeats a key (no `map`/`filter` in between to
    /// reject it), the later value replaces the earlier one in place.
    pub fn to_list(&self) -> Result<IndexMap<K, V>>
    where
        K: Eq + Hash,
    {
        self.traverse("to_list")
            .map(|item| item.map(Entry::into_pair))
            .collect()
    }

    /// Drains the query into its values, in traversal order.
    pub fn to_vec(&self) -> Result<Vec<V>> {
        self.traverse("to_vec")
            .map(|item| item.map(|entry| entry.value))
            .collect()
    }

    /// Drains the query into its keyed elements, in traversal order.
    pub fn to_entries(&self) -> Result<Vec<Entry<K, V>>> {
        self.traverse("to_entries").collect()
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Counts every element.
    pub fn count(&self) -> Result<usize> {
        self.traverse("count")
            .try_fold(0, |count, item| item.map(|_| count + 1))
    }

    /// Counts the elements satisfying `f`.
    pub fn count_where<R, F>(&self, mut f: F) -> Result<usize>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        let mut count = 0;
        for (position, item) in self.traverse("count_where").enumerate() {
            if predicate::test(&mut f, &item?, position)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns `true` if the query yields at least one element.
    ///
    /// Pulls at most one element.
    pub fn any(&self) -> Result<bool> {
        let first = self.traverse("any").next().transpose()?;
        Ok(first.is_some())
    }

    /// Returns `true` if some element satisfies `f`, stopping at the first.
    pub fn any_where<R, F>(&self, mut f: F) -> Result<bool>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        for (position, item) in self.traverse("any_where").enumerate() {
            if predicate::test(&mut f, &item?, position)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns `true` if every element satisfies `f`, stopping at the first
    /// that does not. An empty query returns `true`.
    pub fn all_where<R, F>(&self, mut f: F) -> Result<bool>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        for (position, item) in self.traverse("all_where").enumerate() {
            if !predicate::test(&mut f, &item?, position)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ========================================================================
    // First
    // ========================================================================

    /// Returns the first value, or [`QueryError::NoValue`] if there is none.
    pub fn first(&self) -> Result<V> {
        self.first_or_default()?.ok_or(QueryError::NoValue)
    }

    /// Returns the first value satisfying `f`, or [`QueryError::NoValue`].
    pub fn first_where<R, F>(&self, f: F) -> Result<V>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        self.first_or_default_where(f)?.ok_or(QueryError::NoValue)
    }

    /// Returns the first value, or `None` if the query is empty.
    pub fn first_or_default(&self) -> Result<Option<V>> {
        let first = self.traverse("first").next().transpose()?;
        Ok(first.map(|entry| entry.value))
    }

    /// Returns the first value satisfying `f`, or `None` if nothing does.
    pub fn first_or_default_where<R, F>(&self, mut f: F) -> Result<Option<V>>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        for (position, item) in self.traverse("first_where").enumerate() {
            let entry = item?;
            if predicate::test(&mut f, &entry, position)? {
                return Ok(Some(entry.value));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Last
    // ========================================================================

    /// Returns the last value, or [`QueryError::NoValue`] if there is none.
    pub fn last(&self) -> Result<V> {
        self.last_or_default()?.ok_or(QueryError::NoValue)
    }

    /// Returns the last value satisfying `f`, or [`QueryError::NoValue`].
    pub fn last_where<R, F>(&self, f: F) -> Result<V>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        self.last_or_default_where(f)?.ok_or(QueryError::NoValue)
    }

    /// Returns the last value, or `None` if the query is empty.
    ///
    /// Drains the whole query.
    pub fn last_or_default(&self) -> Result<Option<V>> {
        let entries: Vec<Entry<K, V>> = self.traverse("last").collect::<Result<_>>()?;
        Ok(entries.into_iter().next_back().map(|entry| entry.value))
    }

    /// Returns the last value satisfying `f`, or `None` if nothing does.
    ///
    /// Drains the whole query, then tests elements from the end backwards,
    /// stopping at the first match. Positions in errors still count from the
    /// front.
    pub fn last_or_default_where<R, F>(&self, mut f: F) -> Result<Option<V>>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        let entries: Vec<Entry<K, V>> = self.traverse("last_where").collect::<Result<_>>()?;
        for (position, entry) in entries.into_iter().enumerate().rev() {
            if predicate::test(&mut f, &entry, position)? {
                return Ok(Some(entry.value));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Single
    // ========================================================================

    /// Returns the only value satisfying `f`.
    ///
    /// Fails with [`QueryError::NoValue`] when nothing matches and with
    /// [`QueryError::TooManyValues`] when more than one element does.
    pub fn single<R, F>(&self, f: F) -> Result<V>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        self.single_or_default(f)?.ok_or(QueryError::NoValue)
    }

    /// Returns the only value satisfying `f`, or `None` when nothing matches.
    ///
    /// More than one match is still [`QueryError::TooManyValues`].
    pub fn single_or_default<R, F>(&self, mut f: F) -> Result<Option<V>>
    where
        R: Into<Value>,
        F: FnMut(&V, &K) -> R,
    {
        let mut matches = Vec::new();
        for (position, item) in self.traverse("single").enumerate() {
            let entry = item?;
            if predicate::test(&mut f, &entry, position)? {
                matches.push(entry.value);
            }
        }

        match matches.len() {
            0 | 1 => Ok(matches.pop()),
            count => Err(QueryError::TooManyValues { count }),
        }
    }
}
