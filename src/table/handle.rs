//! Atomically swappable table handle for hosts that rebuild while matching.

use crate::table::LookupTable;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared slot holding the current [`LookupTable`].
///
/// Readers clone the `Arc` and vote against that snapshot; writers publish a
/// fully built replacement. A voting pass therefore sees either the old table
/// or the new one, never a mix.
#[derive(Debug)]
pub struct TableHandle {
    current: RwLock<Arc<LookupTable>>,
}

impl TableHandle {
    /// Creates a handle publishing `table`.
    pub fn new(table: LookupTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Returns a snapshot of the current table.
    pub fn load(&self) -> Arc<LookupTable> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publishes `table`, returning the previously published one.
    pub fn replace(&self, table: Arc<LookupTable>) -> Arc<LookupTable> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, table)
    }

    /// Publishes `table`, dropping this handle's reference to the old one.
    pub fn store(&self, table: LookupTable) {
        self.replace(Arc::new(table));
    }
}
