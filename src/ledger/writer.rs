//! Ledger writer and timeline reader

use std::fmt::Display;
use std::sync::Arc;

use super::event::{EventType, IncidentEvent, NewIncidentEvent};
use crate::clock::Clock;
use crate::incident::{IncidentId, IncidentStatus};
use crate::observability::{Event, MetricsRegistry};
use crate::priority::RiskLevel;
use crate::store::{EventStore, StoreResult};

/// Append-only writer and reader of incident lifecycle events.
///
/// Each append is one store call, so it is committed as a unit or not at
/// all. Storage errors are returned unchanged and never retried.
pub struct EventLedger<S: EventStore + ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl<S: EventStore + ?Sized> EventLedger<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Append one event stamped with the current time.
    pub fn record_event(
        &self,
        incident_id: IncidentId,
        event_type: EventType,
        description: impl Into<String>,
    ) -> StoreResult<IncidentEvent> {
        let event = self.store.append_event(NewIncidentEvent {
            incident_id,
            event_type,
            description: description.into(),
            created_at: self.clock.now(),
        })?;

        if let Some(metrics) = &self.metrics {
            metrics.increment_events_recorded();
        }
        tracing::debug!(
            event = %Event::LedgerEventRecorded,
            incident_id = %incident_id,
            event_type = %event_type,
            sequence = event.sequence
        );

        Ok(event)
    }

    pub fn record_detected(
        &self,
        incident_id: IncidentId,
        source: &str,
    ) -> StoreResult<IncidentEvent> {
        self.record_event(
            incident_id,
            EventType::Detected,
            format!("Incident detected from source: {}", source),
        )
    }

    pub fn record_alerted(
        &self,
        incident_id: IncidentId,
        risk: RiskLevel,
    ) -> StoreResult<IncidentEvent> {
        self.record_event(
            incident_id,
            EventType::Alerted,
            format!("Incident crossed alert threshold (risk={})", risk),
        )
    }

    pub fn record_escalated(
        &self,
        incident_id: IncidentId,
        from: impl Display,
        to: impl Display,
    ) -> StoreResult<IncidentEvent> {
        self.record_event(
            incident_id,
            EventType::Escalated,
            format!("Risk escalated from {} to {}", from, to),
        )
    }

    pub fn record_response_drafted(&self, incident_id: IncidentId) -> StoreResult<IncidentEvent> {
        self.record_event(
            incident_id,
            EventType::ResponseDrafted,
            "AI-assisted response draft generated",
        )
    }

    pub fn record_status_change(
        &self,
        incident_id: IncidentId,
        status: IncidentStatus,
    ) -> StoreResult<IncidentEvent> {
        self.record_event(
            incident_id,
            EventType::StatusChanged,
            format!("Incident status changed to '{}'", status),
        )
    }

    pub fn record_closed(&self, incident_id: IncidentId) -> StoreResult<IncidentEvent> {
        self.record_event(incident_id, EventType::Closed, "Incident closed")
    }

    /// Events of one incident, oldest first.
    ///
    /// Ordered by `created_at`; equal timestamps fall back to append order.
    /// Every call reads the store afresh.
    pub fn get_timeline(&self, incident_id: IncidentId) -> StoreResult<Vec<IncidentEvent>> {
        let mut events = self.store.events_for(incident_id)?;
        events.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.sequence.cmp(&b.sequence))
        });
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{MemoryStore, StoreError};
    use chrono::{Duration, TimeZone, Utc};
    use std::io;

    fn ledger() -> (Arc<ManualClock>, EventLedger<MemoryStore>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ));
        let ledger = EventLedger::new(Arc::new(MemoryStore::new()), clock.clone());
        (clock, ledger)
    }

    #[test]
    fn test_helper_descriptions() {
        let (_, ledger) = ledger();
        let id = IncidentId(1);

        let cases = [
            (
                ledger.record_detected(id, "reddit").unwrap(),
                EventType::Detected,
                "Incident detected from source: reddit",
            ),
            (
                ledger.record_alerted(id, RiskLevel::High).unwrap(),
                EventType::Alerted,
                "Incident crossed alert threshold (risk=high)",
            ),
            (
                ledger
                    .record_escalated(id, RiskLevel::Low, RiskLevel::Medium)
                    .unwrap(),
                EventType::Escalated,
                "Risk escalated from low to medium",
            ),
            (
                ledger.record_response_drafted(id).unwrap(),
                EventType::ResponseDrafted,
                "AI-assisted response draft generated",
            ),
            (
                ledger
                    .record_status_change(id, IncidentStatus::Monitoring)
                    .unwrap(),
                EventType::StatusChanged,
                "Incident status changed to 'monitoring'",
            ),
            (
                ledger.record_closed(id).unwrap(),
                EventType::Closed,
                "Incident closed",
            ),
        ];

        for (event, event_type, description) in cases {
            assert_eq!(event.event_type, event_type);
            assert_eq!(event.description, description);
        }
    }

    #[test]
    fn test_timeline_orders_by_time_then_sequence() {
        let (clock, ledger) = ledger();
        let id = IncidentId(7);

        ledger.record_event(id, EventType::Detected, "first").unwrap();
        ledger.record_event(id, EventType::Alerted, "same instant").unwrap();
        clock.advance(Duration::seconds(5));
        ledger.record_event(id, EventType::Closed, "later").unwrap();
        ledger.record_event(IncidentId(8), EventType::Detected, "other").unwrap();

        let timeline = ledger.get_timeline(id).unwrap();
        let descriptions: Vec<&str> = timeline.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["first", "same instant", "later"]);
    }

    #[test]
    fn test_timeline_sorts_out_of_order_timestamps() {
        let (clock, ledger) = ledger();
        let id = IncidentId(1);

        clock.advance(Duration::seconds(10));
        ledger.record_event(id, EventType::Detected, "b").unwrap();
        clock.set(Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap());
        ledger.record_event(id, EventType::Detected, "a").unwrap();

        let timeline = ledger.get_timeline(id).unwrap();
        assert_eq!(timeline[0].description, "a");
        assert_eq!(timeline[1].description, "b");
    }

    #[test]
    fn test_empty_timeline() {
        let (_, ledger) = ledger();
        assert!(ledger.get_timeline(IncidentId(99)).unwrap().is_empty());
    }

    struct BrokenStore;

    impl EventStore for BrokenStore {
        fn append_event(&self, _new: NewIncidentEvent) -> StoreResult<IncidentEvent> {
            Err(StoreError::io(
                "/dev/full",
                io::Error::new(io::ErrorKind::Other, "disk full"),
            ))
        }

        fn events_for(&self, _incident_id: IncidentId) -> StoreResult<Vec<IncidentEvent>> {
            Err(StoreError::Corruption("bad".into()))
        }
    }

    #[test]
    fn test_store_errors_propagate_unchanged() {
        let metrics = Arc::new(MetricsRegistry::new());
        let ledger = EventLedger::new(Arc::new(BrokenStore), Arc::new(ManualClock::new(Utc::now())))
            .with_metrics(Arc::clone(&metrics));

        let err = ledger.record_closed(IncidentId(1)).unwrap_err();
        assert_eq!(err.code(), "NC_STORE_IO");
        assert!(matches!(
            ledger.get_timeline(IncidentId(1)),
            Err(StoreError::Corruption(_))
        ));
        assert_eq!(metrics.snapshot().events_recorded, 0);
    }
}
