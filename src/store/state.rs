//! In-memory state shared by the store implementations
//!
//! All three collections are append-only: incidents are updated in place
//! but never removed, events and chain entries are never touched after
//! being appended. Identifiers are positions, so they are never reused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use crate::chain::{LedgerEntry, NewLedgerEntry};
use crate::incident::{truncate_title, Incident, IncidentId, NewIncident};
use crate::ledger::{IncidentEvent, NewIncidentEvent};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    incidents: BTreeMap<u64, Incident>,
    events: Vec<IncidentEvent>,
    entries: Vec<LedgerEntry>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_incident(&mut self, new: NewIncident) -> Incident {
        let id = IncidentId(self.incidents.len() as u64 + 1);
        let incident = new.into_incident(id);
        self.incidents.insert(id.0, incident.clone());
        incident
    }

    pub fn get_incident(&self, id: IncidentId) -> Option<Incident> {
        self.incidents.get(&id.0).cloned()
    }

    /// First incident (lowest id) with this title and source.
    pub fn find_incident(&self, title: &str, source: &str) -> Option<Incident> {
        let title = truncate_title(title);
        self.incidents
            .values()
            .find(|i| i.title == title && i.source == source)
            .cloned()
    }

    pub fn list_incidents(&self) -> Vec<Incident> {
        self.incidents.values().cloned().collect()
    }

    /// Replace the stored incident. Identity fields must not change.
    pub fn update_incident(&mut self, incident: &Incident) -> StoreResult<Incident> {
        let stored = self
            .incidents
            .get_mut(&incident.id.0)
            .ok_or(StoreError::IncidentNotFound(incident.id))?;

        let immutable = [
            ("title", stored.title != incident.title),
            ("source", stored.source != incident.source),
            ("opened_at", stored.opened_at != incident.opened_at),
        ];
        if let Some((field, _)) = immutable.iter().find(|(_, changed)| *changed) {
            return Err(StoreError::ImmutableField {
                id: incident.id,
                field: *field,
            });
        }

        *stored = incident.clone();
        Ok(stored.clone())
    }

    pub fn append_event(&mut self, new: NewIncidentEvent) -> IncidentEvent {
        let event = new.into_event(self.events.len() as u64 + 1);
        self.events.push(event.clone());
        event
    }

    /// Events for one incident, in append order.
    pub fn events_for(&self, incident_id: IncidentId) -> Vec<IncidentEvent> {
        self.events
            .iter()
            .filter(|e| e.incident_id == incident_id)
            .cloned()
            .collect()
    }

    /// Append a chain entry, refusing any entry that does not link to the
    /// current tip.
    pub fn append_entry(&mut self, new: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        let tip = self.entries.last().map(|e| e.hash.clone());
        if new.prev_hash != tip {
            return Err(StoreError::ChainConflict {
                expected: tip,
                provided: new.prev_hash,
            });
        }
        let entry = new.into_entry(self.entries.len() as u64 + 1);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn last_entry(&self) -> Option<LedgerEntry> {
        self.entries.last().cloned()
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::IncidentStatus;
    use crate::ledger::EventType;
    use crate::priority::RiskLevel;
    use chrono::Utc;
    use serde_json::json;

    fn new_incident(title: &str, source: &str) -> NewIncident {
        NewIncident::new(title, source, RiskLevel::Low, Utc::now())
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut state = StoreState::new();
        let a = state.insert_incident(new_incident("a", "news"));
        let b = state.insert_incident(new_incident("b", "news"));
        assert_eq!(a.id, IncidentId(1));
        assert_eq!(b.id, IncidentId(2));
    }

    #[test]
    fn test_find_by_title_and_source() {
        let mut state = StoreState::new();
        let a = state.insert_incident(new_incident("same", "news"));
        state.insert_incident(new_incident("same", "reddit"));

        assert_eq!(state.find_incident("same", "news").unwrap().id, a.id);
        assert!(state.find_incident("same", "web").is_none());
    }

    #[test]
    fn test_update_rejects_identity_change() {
        let mut state = StoreState::new();
        let mut a = state.insert_incident(new_incident("a", "news"));
        a.source = "reddit".to_string();

        let err = state.update_incident(&a).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ImmutableField { field: "source", .. }
        ));
    }

    #[test]
    fn test_update_missing_incident() {
        let mut state = StoreState::new();
        let ghost = new_incident("ghost", "web").into_incident(IncidentId(9));
        assert!(matches!(
            state.update_incident(&ghost),
            Err(StoreError::IncidentNotFound(IncidentId(9)))
        ));
    }

    #[test]
    fn test_update_replaces_mutable_fields() {
        let mut state = StoreState::new();
        let mut a = state.insert_incident(new_incident("a", "news"));
        a.status = IncidentStatus::Monitoring;
        state.update_incident(&a).unwrap();
        assert_eq!(
            state.get_incident(a.id).unwrap().status,
            IncidentStatus::Monitoring
        );
    }

    #[test]
    fn test_events_filtered_per_incident() {
        let mut state = StoreState::new();
        for id in [1, 2, 1] {
            state.append_event(NewIncidentEvent {
                incident_id: IncidentId(id),
                event_type: EventType::Detected,
                description: "d".into(),
                created_at: Utc::now(),
            });
        }
        let events = state.events_for(IncidentId(1));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 3);
    }

    #[test]
    fn test_chain_fork_rejected() {
        let mut state = StoreState::new();
        let genesis = state
            .append_entry(NewLedgerEntry::link(None, None, json!(1), Utc::now()))
            .unwrap();

        // A second genesis would fork the chain.
        let fork = NewLedgerEntry::link(None, None, json!(2), Utc::now());
        assert!(matches!(
            state.append_entry(fork),
            Err(StoreError::ChainConflict { .. })
        ));

        let next = NewLedgerEntry::link(Some(genesis.hash.clone()), None, json!(2), Utc::now());
        assert_eq!(state.append_entry(next).unwrap().sequence, 2);
    }
}
