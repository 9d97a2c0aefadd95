//! Key integrity tracking for a single stage traversal.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::error::{QueryError, Result};

/// The set of keys a stage has yielded during one traversal.
///
/// A guard is created when a stage's cursor is opened and dropped with it,
/// so nothing carries over between evaluations.
#[derive(Debug)]
pub(crate) struct KeyGuard<K> {
    stage: &'static str,
    seen: HashSet<K>,
}

impl<K> KeyGuard<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub(crate) fn new(stage: &'static str) -> Self {
        KeyGuard {
            stage,
            seen: HashSet::new(),
        }
    }

    /// Records `key`, or fails if this traversal already yielded it.
    pub(crate) fn admit(&mut self, key: &K, position: usize) -> Result<()> {
        if self.seen.insert(key.clone()) {
            return Ok(());
        }
        debug!(stage = self.stage, ?key, position, "duplicate key rejected");
        Err(QueryError::key_duplicate(key, position))
    }
}
