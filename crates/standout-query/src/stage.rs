//! Deferred pipeline stages and their cursors.
//!
//! A stage is an immutable description of one step in a query. Opening it
//! produces a cursor: a pull-based iterator that requests exactly one
//! upstream element per output element it needs. Cursors own all
//! per-traversal state (positions, key guards), so opening the same stage
//! twice gives two independent traversals.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::entry::Entry;
use crate::error::Result;
use crate::guard::KeyGuard;
use crate::predicate::expect_bool;
use crate::source::Source;
use crate::value::Value;

/// One live traversal of a stage.
pub(crate) type Cursor<'s, K, V> = Box<dyn Iterator<Item = Result<Entry<K, V>>> + 's>;

/// A node in the query chain.
pub(crate) trait Stage<'a, K, V> {
    fn open<'s>(&'s self) -> Cursor<'s, K, V>
    where
        'a: 's;
}

/// Upstream of a stage, boxed so chains have a single nameable type.
pub(crate) type Upstream<'a, K, V> = Box<dyn Stage<'a, K, V> + 'a>;

// ============================================================================
// Root
// ============================================================================

/// Adapts a [`Source`] into the head of a chain.
pub(crate) struct Root<S> {
    source: S,
}

impl<S> Root<S> {
    pub(crate) fn new(source: S) -> Self {
        Root { source }
    }
}

impl<'a, K, V, S> Stage<'a, K, V> for Root<S>
where
    K: 'a,
    V: 'a,
    S: Source<'a, K, V>,
{
    fn open<'s>(&'s self) -> Cursor<'s, K, V>
    where
        'a: 's,
    {
        Box::new(self.source.entries().map(Ok))
    }
}

// ============================================================================
// Map
// ============================================================================

/// Transforms each value, optionally rewriting its key.
pub(crate) struct Mapped<'a, K, V, U, F> {
    upstream: Upstream<'a, K, V>,
    map: F,
    _output: PhantomData<fn() -> U>,
}

impl<'a, K, V, U, F> Mapped<'a, K, V, U, F>
where
    F: Fn(V, &mut K) -> U,
{
    pub(crate) fn new(upstream: Upstream<'a, K, V>, map: F) -> Self {
        Mapped {
            upstream,
            map,
            _output: PhantomData,
        }
    }
}

impl<'a, K, V, U, F> Stage<'a, K, U> for Mapped<'a, K, V, U, F>
where
    K: Eq + Hash + Clone + fmt::Debug + 'a,
    V: 'a,
    U: 'a,
    F: Fn(V, &mut K) -> U + 'a,
{
    fn open<'s>(&'s self) -> Cursor<'s, K, U>
    where
        'a: 's,
    {
        Box::new(MapCursor {
            upstream: self.upstream.open(),
            map: &self.map,
            guard: KeyGuard::new("map"),
            position: 0,
            done: false,
            _output: PhantomData,
        })
    }
}

struct MapCursor<'s, K, V, U, F> {
    upstream: Cursor<'s, K, V>,
    map: &'s F,
    guard: KeyGuard<K>,
    position: usize,
    done: bool,
    _output: PhantomData<fn() -> U>,
}

impl<K, V, U, F> MapCursor<'_, K, V, U, F>
where
    K: Eq + Hash + Clone + fmt::Debug,
    F: Fn(V, &mut K) -> U,
{
    fn step(&mut self, entry: Entry<K, V>) -> Result<Entry<K, U>> {
        let Entry { mut key, value } = entry;
        let position = self.position;
        self.position += 1;

        let value = (self.map)(value, &mut key);
        self.guard.admit(&key, position)?;
        Ok(Entry { key, value })
    }
}

impl<K, V, U, F> Iterator for MapCursor<'_, K, V, U, F>
where
    K: Eq + Hash + Clone + fmt::Debug,
    F: Fn(V, &mut K) -> U,
{
    type Item = Result<Entry<K, U>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.upstream.next()?.and_then(|entry| self.step(entry));
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Keeps elements whose predicate returns `true`.
pub(crate) struct Filtered<'a, K, V, R, F> {
    upstream: Upstream<'a, K, V>,
    predicate: F,
    _output: PhantomData<fn() -> R>,
}

impl<'a, K, V, R, F> Filtered<'a, K, V, R, F>
where
    F: Fn(&V, &mut K) -> R,
{
    pub(crate) fn new(upstream: Upstream<'a, K, V>, predicate: F) -> Self {
        Filtered {
            upstream,
            predicate,
            _output: PhantomData,
        }
    }
}

impl<'a, K, V, R, F> Stage<'a, K, V> for Filtered<'a, K, V, R, F>
where
    K: Eq + Hash + Clone + fmt::Debug + 'a,
    V: 'a,
    R: Into<Value> + 'a,
    F: Fn(&V, &mut K) -> R + 'a,
{
    fn open<'s>(&'s self) -> Cursor<'s, K, V>
    where
        'a: 's,
    {
        Box::new(FilterCursor {
            upstream: self.upstream.open(),
            predicate: &self.predicate,
            guard: KeyGuard::new("filter"),
            position: 0,
            done: false,
            _output: PhantomData,
        })
    }
}

struct FilterCursor<'s, K, V, R, F> {
    upstream: Cursor<'s, K, V>,
    predicate: &'s F,
    guard: KeyGuard<K>,
    position: usize,
    done: bool,
    _output: PhantomData<fn() -> R>,
}

impl<K, V, R, F> FilterCursor<'_, K, V, R, F>
where
    K: Eq + Hash + Clone + fmt::Debug,
    R: Into<Value>,
    F: Fn(&V, &mut K) -> R,
{
    /// Returns `Ok(None)` for elements the predicate drops.
    fn step(&mut self, entry: Entry<K, V>) -> Result<Option<Entry<K, V>>> {
        let Entry { mut key, value } = entry;
        let position = self.position;
        self.position += 1;

        let outcome = (self.predicate)(&value, &mut key);
        if !expect_bool(outcome, &key, position)? {
            return Ok(None);
        }
        self.guard.admit(&key, position)?;
        Ok(Some(Entry { key, value }))
    }
}

impl<K, V, R, F> Iterator for FilterCursor<'_, K, V, R, F>
where
    K: Eq + Hash + Clone + fmt::Debug,
    R: Into<Value>,
    F: Fn(&V, &mut K) -> R,
{
    type Item = Result<Entry<K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let item = self.upstream.next()?.and_then(|entry| self.step(entry));
            match item {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::source::Ordered;
    use std::cell::Cell;

    fn root<'a>(values: &[i32]) -> Upstream<'a, usize, i32> {
        Box::new(Root::new(Ordered::from_values(values.to_vec())))
    }

    fn collect<K, V>(cursor: Cursor<'_, K, V>) -> Result<Vec<(K, V)>> {
        cursor.map(|item| item.map(Entry::into_pair)).collect()
    }

    #[test]
    fn root_yields_source_entries() {
        let stage = root(&[5, 6]);
        assert_eq!(collect(stage.open()), Ok(vec![(0, 5), (1, 6)]));
    }

    #[test]
    fn map_transforms_values_and_keeps_keys() {
        let stage = Mapped::new(root(&[1, 2]), |v: i32, _k: &mut usize| v * 10);
        assert_eq!(collect(stage.open()), Ok(vec![(0, 10), (1, 20)]));
    }

    #[test]
    fn map_pulls_one_upstream_element_per_output() {
        let calls = Cell::new(0);
        let stage = Mapped::new(root(&[1, 2, 3]), |v: i32, _k: &mut usize| {
            calls.set(calls.get() + 1);
            v
        });

        let mut cursor = stage.open();
        assert_eq!(calls.get(), 0);
        cursor.next();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn map_cursor_fuses_after_duplicate() {
        let stage = Mapped::new(root(&[1, 2, 3]), |v: i32, k: &mut usize| {
            *k = 0;
            v
        });

        let mut cursor = stage.open();
        assert!(matches!(cursor.next(), Some(Ok(_))));
        assert_eq!(
            cursor.next(),
            Some(Err(QueryError::KeyDuplicate {
                key: "0".to_string(),
                position: 1,
            }))
        );
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn each_open_gets_a_fresh_guard() {
        let stage = Mapped::new(root(&[1]), |v: i32, _k: &mut usize| v);
        assert!(collect(stage.open()).is_ok());
        assert!(collect(stage.open()).is_ok());
    }

    #[test]
    fn filter_yields_original_value() {
        let stage = Filtered::new(root(&[1, 2, 3]), |v: &i32, _k: &mut usize| *v > 1);
        assert_eq!(collect(stage.open()), Ok(vec![(1, 2), (2, 3)]));
    }

    #[test]
    fn filter_dropped_keys_are_not_recorded() {
        // Every key collapses to 9, but only one element passes.
        let stage = Filtered::new(root(&[1, 2, 3]), |v: &i32, k: &mut usize| {
            *k = 9;
            *v == 2
        });
        assert_eq!(collect(stage.open()), Ok(vec![(9, 2)]));
    }

    #[test]
    fn filter_rejects_non_bool() {
        let stage = Filtered::new(root(&[1, 2]), |v: &i32, _k: &mut usize| *v);
        let err = collect(stage.open()).unwrap_err();
        assert_eq!(
            err,
            QueryError::PredicateType {
                actual: "number",
                key: "0".to_string(),
                position: 0,
            }
        );
    }

    #[test]
    fn filter_propagates_upstream_error_once() {
        let mapped = Mapped::new(root(&[1, 2, 3]), |v: i32, k: &mut usize| {
            *k = 0;
            v
        });
        let stage = Filtered::new(Box::new(mapped), |_v: &i32, _k: &mut usize| true);

        let mut cursor = stage.open();
        assert!(matches!(cursor.next(), Some(Ok(_))));
        assert!(matches!(cursor.next(), Some(Err(e)) if e.is_key_duplicate()));
        assert_eq!(cursor.next(), None);
    }
}
