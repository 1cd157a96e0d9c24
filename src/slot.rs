//! Single-slot store for the latest display records.
//!
//! The dispatcher replaces the contents after each non-empty run; the web
//! presenter reads snapshots. Runs are not serialized, so when two runs
//! overlap the slot ends up holding whichever run called
//! [`DisplaySlot::replace`] last. Readers always see one complete list,
//! never a mix of two runs.

use crate::links::DisplayRecord;
use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable handle to the shared slot.
#[derive(Debug, Clone)]
pub struct DisplaySlot {
    records: Arc<RwLock<Arc<[DisplayRecord]>>>,
}

impl DisplaySlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Arc::from(Vec::new()))),
        }
    }

    /// The current records. Cheap: clones an `Arc`, not the list.
    pub fn snapshot(&self) -> Arc<[DisplayRecord]> {
        // The guarded value is a plain pointer swap, so a poisoned lock still
        // holds a complete list.
        let guard = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Replace the contents, returning the previous records.
    pub fn replace(&self, records: Vec<DisplayRecord>) -> Arc<[DisplayRecord]> {
        let next: Arc<[DisplayRecord]> = records.into();
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if no run has stored anything yet (or the last store was empty).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DisplaySlot {
    fn default() -> Self {
        Self::new()
    }
}
