//! Query construction and chaining.
//!
//! The [`Query`] struct wraps a chain of deferred stages. Chaining operators
//! consume the query and return a new one; evaluation lives in the terminal
//! methods (see the `eval` module).

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::entry::Entry;
use crate::error::Result;
use crate::source::{OneShot, Ordered, Producer, Source};
use crate::stage::{Cursor, Filtered, Mapped, Root, Upstream};
use crate::value::Value;

/// A lazy query over an ordered sequence of keyed elements.
///
/// Building a query never runs any callback. Work happens only when a
/// terminal evaluator such as [`to_list`](Self::to_list) or
/// [`first`](Self::first) pulls elements through the chain, and every
/// evaluation re-drives the chain from its source.
///
/// The `'a` lifetime bounds the source and the callbacks, which may borrow
/// from the surrounding scope.
///
/// # Example
///
/// ```
/// use standout_query::Query;
///
/// let query = Query::from(vec![1, 2, 3, 4])
///     .filter(|v, _| *v % 2 == 0)
///     .map(|v, _| v * 10);
///
/// let list = query.to_list().unwrap();
/// assert_eq!(list.get(&1), Some(&20));
/// assert_eq!(list.get(&3), Some(&40));
/// assert_eq!(query.count().unwrap(), 2);
/// ```
pub struct Query<'a, K, V> {
    stage: Upstream<'a, K, V>,
}

impl<'a, K, V> Query<'a, K, V>
where
    K: 'a,
    V: 'a,
{
    // ========================================================================
    // Construction
    // ========================================================================

    /// Creates a query over any [`Source`].
    pub fn from_source<S>(source: S) -> Self
    where
        S: Source<'a, K, V> + 'a,
    {
        Query {
            stage: Box::new(Root::new(source)),
        }
    }

    /// Creates a query over `(key, value)` pairs, kept in the given order.
    ///
    /// The pairs are collected up front and cloned on each evaluation.
    pub fn from_entries<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Clone,
        V: Clone,
    {
        Self::from_source(Ordered::new(pairs))
    }

    /// Creates a query over an externally driven producer.
    ///
    /// `factory` is called at the start of every evaluation and its items
    /// are pulled lazily, so `first` and `any` stop the producer early.
    ///
    /// ```
    /// use standout_query::Query;
    ///
    /// let squares = Query::from_fn(|| (1u64..).map(|n| (n, n * n)));
    /// assert_eq!(squares.first_where(|v, _| *v > 50).unwrap(), 64);
    /// ```
    pub fn from_fn<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: 'a,
    {
        Self::from_source(Producer::new(factory))
    }

    /// Creates a query over a single-use iterator.
    ///
    /// Only the first evaluation sees the elements; later evaluations run
    /// over an empty sequence.
    pub fn from_iter_once<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: 'a,
    {
        Self::from_source(OneShot::new(iter.into_iter()))
    }

    // ========================================================================
    // Deferred operators
    // ========================================================================

    /// Transforms every value with `f(value, &mut key)`.
    ///
    /// The callback may rewrite the key. Keys leaving this stage must be
    /// unique within one evaluation; a repeat aborts it with
    /// [`QueryError::KeyDuplicate`](crate::QueryError::KeyDuplicate).
    ///
    /// ```
    /// use standout_query::Query;
    ///
    /// let renamed = Query::from_entries([("key1".to_string(), 1), ("key2".to_string(), 2)])
    ///     .map(|v, k| {
    ///         *k = format!("new {k}");
    ///         v + 1
    ///     })
    ///     .to_list()
    ///     .unwrap();
    ///
    /// assert_eq!(renamed["new key1"], 2);
    /// assert_eq!(renamed["new key2"], 3);
    /// ```
    pub fn map<U, F>(self, f: F) -> Query<'a, K, U>
    where
        K: Eq + Hash + Clone + fmt::Debug,
        U: 'a,
        F: Fn(V, &mut K) -> U + 'a,
    {
        Query {
            stage: Box::new(Mapped::new(self.stage, f)),
        }
    }

    /// Keeps the elements for which `f(&value, &mut key)` returns `true`.
    ///
    /// The predicate must return a boolean (anything convertible to
    /// [`Value`] is accepted, but only [`Value::Bool`] passes). Kept
    /// elements carry their original value and the key as left by the
    /// callback; kept keys must be unique within one evaluation.
    pub fn filter<R, F>(self, f: F) -> Self
    where
        K: Eq + Hash + Clone + fmt::Debug,
        R: Into<Value> + 'a,
        F: Fn(&V, &mut K) -> R + 'a,
    {
        Query {
            stage: Box::new(Filtered::new(self.stage, f)),
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Opens a fresh traversal over the query's output.
    ///
    /// The iterator stops after yielding its first error.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cursor: self.stage.open(),
        }
    }
}

impl<'a, V> Query<'a, usize, V>
where
    V: Clone + 'a,
{
    /// Creates an array-like query whose keys are ordinal positions.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Self::from_source(Ordered::from_values(values))
    }
}

impl<'a, V> From<Vec<V>> for Query<'a, usize, V>
where
    V: Clone + 'a,
{
    fn from(values: Vec<V>) -> Self {
        Query::from_values(values)
    }
}

impl<'a, K, V> From<IndexMap<K, V>> for Query<'a, K, V>
where
    K: Clone + 'a,
    V: Clone + 'a,
{
    fn from(map: IndexMap<K, V>) -> Self {
        Query::from_entries(map)
    }
}

impl<K, V> fmt::Debug for Query<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").finish_non_exhaustive()
    }
}

/// Iterator over one evaluation of a [`Query`].
///
/// Created by [`Query::iter`].
pub struct Iter<'s, K, V> {
    cursor: Cursor<'s, K, V>,
}

impl<K, V> Iterator for Iter<'_, K, V> {
    type Item = Result<Entry<K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").finish_non_exhaustive()
    }
}
