//! Sequence sources: where a query's elements come from.
//!
//! A [`Source`] hands out a fresh ordered stream of [`Entry`] values every
//! time a query is evaluated. Three sources ship with the crate:
//!
//! | Source | Re-iterable | Typical constructor |
//! |--------|-------------|---------------------|
//! | [`Ordered`] | yes | [`Query::from_values`](crate::Query::from_values), [`Query::from_entries`](crate::Query::from_entries) |
//! | [`Producer`] | yes | [`Query::from_fn`](crate::Query::from_fn) |
//! | [`OneShot`] | no | [`Query::from_iter_once`](crate::Query::from_iter_once) |

use std::cell::RefCell;
use std::iter;

use tracing::debug;

use crate::entry::Entry;

/// A boxed stream of entries borrowed from a source.
pub type Entries<'s, K, V> = Box<dyn Iterator<Item = Entry<K, V>> + 's>;

/// A producer of keyed elements.
///
/// Every terminal evaluator re-drives its query from the root, so
/// [`entries`](Self::entries) is called once per evaluation. Implementations
/// that can only be consumed once should yield an empty stream afterwards.
///
/// # Example
///
/// ```
/// use standout_query::{Entries, Entry, Query, Source};
///
/// struct Countdown(u32);
///
/// impl<'a> Source<'a, u32, String> for Countdown {
///     fn entries<'s>(&'s self) -> Entries<'s, u32, String>
///     where
///         'a: 's,
///     {
///         Box::new((0..self.0).rev().map(|n| Entry::new(n, format!("T-{n}"))))
///     }
/// }
///
/// let first = Query::from_source(Countdown(3)).first().unwrap();
/// assert_eq!(first, "T-2");
/// ```
pub trait Source<'a, K, V> {
    /// Opens a new stream over this source's entries.
    fn entries<'s>(&'s self) -> Entries<'s, K, V>
    where
        'a: 's;
}

/// A finite ordered collection.
///
/// Entries are cloned out on every traversal, so the collection can be
/// evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> Ordered<K, V> {
    /// Creates a collection from `(key, value)` pairs, keeping their order.
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Ordered {
            entries: pairs.into_iter().map(Entry::from).collect(),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Ordered<usize, V> {
    /// Creates an array-like collection keyed by ordinal position.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Ordered::new(values.into_iter().enumerate())
    }
}

impl<'a, K, V> Source<'a, K, V> for Ordered<K, V>
where
    K: Clone + 'a,
    V: Clone + 'a,
{
    fn entries<'s>(&'s self) -> Entries<'s, K, V>
    where
        'a: 's,
    {
        Box::new(self.entries.iter().cloned())
    }
}

/// An externally driven lazy producer.
///
/// The factory is called once per traversal and must return a fresh
/// iterator each time. Elements are pulled only as the query needs them.
pub struct Producer<F> {
    factory: F,
}

impl<F> Producer<F> {
    /// Wraps a factory closure.
    pub fn new(factory: F) -> Self {
        Producer { factory }
    }
}

impl<'a, K, V, F, I> Source<'a, K, V> for Producer<F>
where
    K: 'a,
    V: 'a,
    F: Fn() -> I,
    I: IntoIterator<Item = (K, V)>,
    I::IntoIter: 'a,
{
    fn entries<'s>(&'s self) -> Entries<'s, K, V>
    where
        'a: 's,
    {
        Box::new((self.factory)().into_iter().map(Entry::from))
    }
}

/// A single-use iterator.
///
/// The first traversal drains the wrapped iterator. Later traversals see an
/// empty sequence, so callers should evaluate a one-shot query only once.
pub struct OneShot<I> {
    iter: RefCell<Option<I>>,
}

impl<I> OneShot<I> {
    /// Wraps an iterator.
    pub fn new(iter: I) -> Self {
        OneShot {
            iter: RefCell::new(Some(iter)),
        }
    }

    /// Returns `true` once the iterator has been handed out.
    pub fn is_spent(&self) -> bool {
        self.iter.borrow().is_none()
    }
}

impl<'a, K, V, I> Source<'a, K, V> for OneShot<I>
where
    K: 'a,
    V: 'a,
    I: Iterator<Item = (K, V)> + 'a,
{
    fn entries<'s>(&'s self) -> Entries<'s, K, V>
    where
        'a: 's,
    {
        match self.iter.borrow_mut().take() {
            Some(iter) => Box::new(iter.map(Entry::from)),
            None => {
                debug!("one-shot source already consumed, yielding nothing");
                Box::new(iter::empty())
            }
        }
    }
}
