//! Lazy, key-preserving query pipelines over ordered key/value sequences.
//!
//! A [`Query`] wraps a sequence of keyed elements and offers a fluent API
//! in two layers:
//!
//! - **Deferred operators** ([`map`](Query::map), [`filter`](Query::filter))
//!   build a new query without touching any element.
//! - **Terminal evaluators** ([`to_list`](Query::to_list),
//!   [`count`](Query::count), [`any`](Query::any), [`first`](Query::first),
//!   [`last`](Query::last), [`single`](Query::single) and their `_where` /
//!   `_or_default` variants) pull elements through the chain and produce a
//!   result.
//!
//! # Quick Start
//!
//! ```rust
//! use standout_query::{Query, QueryError};
//!
//! let query = Query::from(vec![1, 2, 3, 4]).filter(|v, _| *v > 2);
//!
//! assert_eq!(query.first().unwrap(), 3);
//! assert_eq!(query.last().unwrap(), 4);
//! assert_eq!(query.count().unwrap(), 2);
//!
//! // Keys survive filtering: array sources are keyed by position.
//! let list = query.to_list().unwrap();
//! assert_eq!(list.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
//!
//! // `single` insists on exactly one match.
//! assert_eq!(
//!     query.single(|_, _| true),
//!     Err(QueryError::TooManyValues { count: 2 })
//! );
//! assert_eq!(query.single_or_default(|v, _| *v > 10), Ok(None));
//! ```
//!
//! # Evaluation Semantics
//!
//! ```text
//! Source ──▶ map ──▶ filter ──▶ … ──▶ terminal evaluator
//!   ▲                                     │
//!   └──────── re-driven on every call ────┘
//! ```
//!
//! - **Lazy**: building a chain runs no callback. Elements are pulled one at
//!   a time, so `first` and `any` stop their source early.
//! - **Uncached**: every terminal call opens a fresh traversal from the
//!   source. Use a re-iterable source ([`Query::from_values`],
//!   [`Query::from_entries`], [`Query::from_fn`]) to evaluate a query more
//!   than once.
//! - **Key integrity**: within one traversal, a `map` or `filter` stage never
//!   yields the same key twice. Callbacks receive the key by `&mut` and may
//!   rewrite it; a collision aborts with [`QueryError::KeyDuplicate`].
//! - **Strict predicates**: predicates may return any `impl Into<Value>`,
//!   but only a boolean is accepted. Anything else is
//!   [`QueryError::PredicateType`], never a truthy coercion.
//!
//! # Errors
//!
//! | Error | Raised by |
//! |-------|-----------|
//! | [`QueryError::PredicateType`] | any predicate-taking operation |
//! | [`QueryError::KeyDuplicate`] | `map` / `filter` stages |
//! | [`QueryError::NoValue`] | `first`, `last`, `single` (not their `_or_default` forms) |
//! | [`QueryError::TooManyValues`] | `single`, `single_or_default` |

mod entry;
mod error;
mod eval;
mod guard;
mod predicate;
mod query;
pub mod source;
mod stage;
mod value;

// Re-export public API
pub use entry::Entry;
pub use error::{QueryError, Result};
pub use query::{Iter, Query};
pub use source::{Entries, OneShot, Ordered, Producer, Source};
pub use value::{Number, Value};
