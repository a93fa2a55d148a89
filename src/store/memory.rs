//! In-memory store
//!
//! Not durable. Used by tests and by embedders that persist elsewhere.

use std::sync::{Mutex, MutexGuard};

use super::errors::{StoreError, StoreResult};
use super::state::StoreState;
use super::{ChainStore, EventStore, IncidentStore};
use crate::chain::{LedgerEntry, NewLedgerEntry};
use crate::incident::{Incident, IncidentId, NewIncident};
use crate::ledger::{IncidentEvent, NewIncidentEvent};

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing state.
    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreResult<StoreState> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Poisoned("memory store state"))
    }
}

impl IncidentStore for MemoryStore {
    fn insert_incident(&self, new: NewIncident) -> StoreResult<Incident> {
        Ok(self.lock()?.insert_incident(new))
    }

    fn get_incident(&self, id: IncidentId) -> StoreResult<Option<Incident>> {
        Ok(self.lock()?.get_incident(id))
    }

    fn find_incident(&self, title: &str, source: &str) -> StoreResult<Option<Incident>> {
        Ok(self.lock()?.find_incident(title, source))
    }

    fn update_incident(&self, incident: &Incident) -> StoreResult<Incident> {
        self.lock()?.update_incident(incident)
    }

    fn list_incidents(&self) -> StoreResult<Vec<Incident>> {
        Ok(self.lock()?.list_incidents())
    }
}

impl EventStore for MemoryStore {
    fn append_event(&self, new: NewIncidentEvent) -> StoreResult<IncidentEvent> {
        Ok(self.lock()?.append_event(new))
    }

    fn events_for(&self, incident_id: IncidentId) -> StoreResult<Vec<IncidentEvent>> {
        Ok(self.lock()?.events_for(incident_id))
    }
}

impl ChainStore for MemoryStore {
    fn append_entry(&self, new: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        self.lock()?.append_entry(new)
    }

    fn last_entry(&self) -> StoreResult<Option<LedgerEntry>> {
        Ok(self.lock()?.last_entry())
    }

    fn entries(&self) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self.lock()?.entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::RiskLevel;
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .insert_incident(NewIncident::new(
                            &format!("t{}", i),
                            "web",
                            RiskLevel::Low,
                            Utc::now(),
                        ))
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap().0).collect();
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_snapshot_reflects_writes() {
        let store = MemoryStore::new();
        store
            .insert_incident(NewIncident::new("t", "news", RiskLevel::High, Utc::now()))
            .unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.list_incidents().len(), 1);
    }
}
