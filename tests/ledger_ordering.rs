//! Event ledger ordering tests
//!
//! Timelines are ordered by `created_at`, and events that share a timestamp
//! come back in exactly the order they were appended.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use neurochain::clock::ManualClock;
use neurochain::incident::IncidentId;
use neurochain::ledger::{EventLedger, EventType};
use neurochain::store::MemoryStore;

fn frozen_ledger() -> (Arc<ManualClock>, EventLedger<MemoryStore>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap(),
    ));
    let ledger = EventLedger::new(Arc::new(MemoryStore::new()), clock.clone());
    (clock, ledger)
}

// =============================================================================
// ORDERING
// =============================================================================

#[test]
fn test_equal_timestamps_keep_insertion_order() {
    let (_, ledger) = frozen_ledger();
    let id = IncidentId(1);

    for i in 0..50 {
        ledger
            .record_event(id, EventType::StatusChanged, format!("event {}", i))
            .unwrap();
    }

    let timeline = ledger.get_timeline(id).unwrap();
    assert_eq!(timeline.len(), 50);
    for (i, event) in timeline.iter().enumerate() {
        assert_eq!(event.description, format!("event {}", i));
    }
}

#[test]
fn test_timeline_is_non_decreasing() {
    let (clock, ledger) = frozen_ledger();
    let id = IncidentId(3);

    for step in [5, 0, 0, 1, 30, 0, 2] {
        clock.advance(Duration::milliseconds(step));
        ledger.record_event(id, EventType::Alerted, "tick").unwrap();
    }

    let timeline = ledger.get_timeline(id).unwrap();
    for pair in timeline.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
        if pair[0].created_at == pair[1].created_at {
            assert!(pair[0].sequence < pair[1].sequence);
        }
    }
}

#[test]
fn test_interleaved_incidents_are_separated() {
    let (_, ledger) = frozen_ledger();

    ledger.record_detected(IncidentId(1), "news").unwrap();
    ledger.record_detected(IncidentId(2), "reddit").unwrap();
    ledger.record_closed(IncidentId(1)).unwrap();
    ledger.record_alerted(IncidentId(2), Default::default()).unwrap();

    let first: Vec<EventType> = ledger
        .get_timeline(IncidentId(1))
        .unwrap()
        .iter()
        .map(|e| e.event_type)
        .collect();
    let second: Vec<EventType> = ledger
        .get_timeline(IncidentId(2))
        .unwrap()
        .iter()
        .map(|e| e.event_type)
        .collect();

    assert_eq!(first, vec![EventType::Detected, EventType::Closed]);
    assert_eq!(second, vec![EventType::Detected, EventType::Alerted]);
}

#[test]
fn test_fresh_call_sees_new_events() {
    let (_, ledger) = frozen_ledger();
    let id = IncidentId(4);

    ledger.record_detected(id, "web").unwrap();
    let before = ledger.get_timeline(id).unwrap();
    ledger.record_closed(id).unwrap();
    let after = ledger.get_timeline(id).unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 2);
}

// =============================================================================
// STABILITY CONTRACT
// =============================================================================

#[test]
fn test_event_type_literals_serialized() {
    let (_, ledger) = frozen_ledger();
    let event = ledger.record_response_drafted(IncidentId(1)).unwrap();

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event_type"], "response_drafted");
    assert_eq!(json["incident_id"], 1);
}
