//! Per-incident locks
//!
//! Writers touching the same incident run one at a time; writers on
//! different incidents do not wait for each other. An incident that does
//! not exist yet is locked by its `(title, source)` identity so two
//! callers cannot both create it.
//!
//! Lock order: identity before id. Nothing takes an identity lock while
//! holding an id lock.
//!
//! The table only holds keys that are locked or waited on; the last
//! caller out removes its entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::incident::IncidentId;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum LockKey {
    Id(IncidentId),
    Identity { title: String, source: String },
}

#[derive(Debug, Default)]
pub(crate) struct IncidentLocks {
    table: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl IncidentLocks {
    /// Run `f` while holding the lock for `key`.
    pub(crate) fn with<T, E>(&self, key: LockKey, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let lock = {
            let mut table = self
                .table
                .lock()
                .map_err(|_| StoreError::Poisoned("incident lock table"))?;
            Arc::clone(table.entry(key.clone()).or_default())
        };
        let entry = Entry {
            locks: self,
            key,
            lock,
        };
        let _guard = entry
            .lock
            .lock()
            .map_err(|_| StoreError::Poisoned("incident lock"))?;
        f()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.lock().map(|t| t.len()).unwrap_or(0)
    }
}

/// A caller's claim on one table entry. Dropped after the guard.
struct Entry<'a> {
    locks: &'a IncidentLocks,
    key: LockKey,
    lock: Arc<Mutex<()>>,
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        if let Ok(mut table) = self.locks.table.lock() {
            // Table copy plus ours: nobody else holds or waits on it.
            if Arc::strong_count(&self.lock) == 2 {
                table.remove(&self.key);
            }
        }
    }
}
