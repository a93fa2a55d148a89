//! Incident tracker
//!
//! Orchestrates the state machine, the event ledger and the hash chain:
//! - Every mutation of an incident runs under that incident's lock
//! - The incident is persisted before its ledger event is appended
//! - Transitions that change nothing record nothing
//! - Store and transition errors propagate unchanged; nothing is retried

use std::sync::Arc;

use serde_json::json;

use super::errors::{TrackerError, TrackerResult};
use super::locks::{IncidentLocks, LockKey};
use crate::analysis::AnalysisRecord;
use crate::chain::{ChainVerification, HashChain, LedgerEntry};
use crate::clock::{Clock, SystemClock};
use crate::incident::{Incident, IncidentId, IncidentStatus, NewIncident};
use crate::ledger::{EventLedger, IncidentEvent};
use crate::observability::{Event, MetricsRegistry, MetricsSnapshot};
use crate::priority::{AlertPolicy, RiskLevel};
use crate::store::Store;

pub struct IncidentTracker<S: Store> {
    pub(super) store: Arc<S>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) ledger: EventLedger<S>,
    pub(super) chain: HashChain<S>,
    pub(super) metrics: Arc<MetricsRegistry>,
    pub(super) policy: AlertPolicy,
    pub(super) locks: IncidentLocks,
}

impl<S: Store> IncidentTracker<S> {
    /// Tracker on wall-clock time with the default alert policy.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        Self {
            ledger: EventLedger::new(Arc::clone(&store), Arc::clone(&clock))
                .with_metrics(Arc::clone(&metrics)),
            chain: HashChain::new(Arc::clone(&store), Arc::clone(&clock))
                .with_metrics(Arc::clone(&metrics)),
            store,
            clock,
            metrics,
            policy: AlertPolicy::default(),
            locks: IncidentLocks::default(),
        }
    }

    pub fn with_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    pub fn ledger(&self) -> &EventLedger<S> {
        &self.ledger
    }

    pub fn chain(&self) -> &HashChain<S> {
        &self.chain
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn get_incident(&self, id: IncidentId) -> TrackerResult<Incident> {
        self.store
            .get_incident(id)?
            .ok_or(TrackerError::IncidentNotFound(id))
    }

    pub fn list_incidents(&self) -> TrackerResult<Vec<Incident>> {
        Ok(self.store.list_incidents()?)
    }

    /// Lifecycle events of one incident, oldest first.
    pub fn get_timeline(&self, id: IncidentId) -> TrackerResult<Vec<IncidentEvent>> {
        self.get_incident(id)?;
        Ok(self.ledger.get_timeline(id)?)
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Create an incident and record its detection.
    pub fn open_incident(
        &self,
        title: &str,
        source: &str,
        risk_level: RiskLevel,
    ) -> TrackerResult<Incident> {
        self.open(NewIncident::new(title, source, risk_level, self.clock.now()))
    }

    pub(super) fn open(&self, new: NewIncident) -> TrackerResult<Incident> {
        let incident = self.store.insert_incident(new)?;
        self.ledger.record_detected(incident.id, &incident.source)?;
        self.metrics.increment_incidents_opened();

        tracing::info!(
            event = %Event::IncidentOpened,
            incident_id = %incident.id,
            source = %incident.source,
            risk = %incident.risk_level,
            "incident opened"
        );
        Ok(incident)
    }

    /// Mark the incident alerted. Only the first call has any effect.
    pub fn alert(&self, id: IncidentId) -> TrackerResult<bool> {
        self.mutate(id, |incident| {
            if !incident.mark_alerted(self.clock.now())? {
                return Ok(false);
            }
            self.store.update_incident(incident)?;
            self.ledger.record_alerted(id, incident.risk_level)?;

            tracing::warn!(
                event = %Event::IncidentAlerted,
                incident_id = %id,
                risk = %incident.risk_level,
                "incident crossed alert threshold"
            );
            Ok(true)
        })
    }

    /// Alert if the incident's risk and `mentions` meet the policy.
    pub fn evaluate_alert(&self, id: IncidentId, mentions: i64) -> TrackerResult<bool> {
        let incident = self.get_incident(id)?;
        if !self.policy.should_alert(incident.risk_level, mentions) {
            return Ok(false);
        }
        self.alert(id)
    }

    /// Raise the risk level. A level at or below the current one is a no-op
    /// and returns `false`.
    pub fn escalate(&self, id: IncidentId, to: RiskLevel) -> TrackerResult<bool> {
        self.mutate(id, |incident| {
            let Some(from) = incident.escalate(to)? else {
                return Ok(false);
            };
            self.store.update_incident(incident)?;
            self.ledger.record_escalated(id, from, to)?;

            tracing::warn!(
                event = %Event::IncidentEscalated,
                incident_id = %id,
                from = %from,
                to = %to,
                "incident escalated"
            );
            Ok(true)
        })
    }

    /// open → monitoring. No-op from any later status.
    pub fn enter_monitoring(&self, id: IncidentId) -> TrackerResult<bool> {
        self.mutate(id, |incident| self.apply_monitoring(incident))
    }

    pub(super) fn apply_monitoring(&self, incident: &mut Incident) -> TrackerResult<bool> {
        if !incident.enter_monitoring()? {
            return Ok(false);
        }
        self.store.update_incident(incident)?;
        self.ledger
            .record_status_change(incident.id, IncidentStatus::Monitoring)?;

        tracing::info!(
            event = %Event::IncidentMonitoring,
            incident_id = %incident.id,
            "incident under monitoring"
        );
        Ok(true)
    }

    /// Store a generated response draft.
    ///
    /// The draft text always replaces the previous one; `response_drafted_at`
    /// keeps its first value. Every draft is recorded in the ledger.
    pub fn record_response(&self, id: IncidentId, draft: &str) -> TrackerResult<Incident> {
        self.mutate(id, |incident| {
            let first = incident.mark_responded(draft, self.clock.now())?;
            let stored = self.store.update_incident(incident)?;
            self.ledger.record_response_drafted(id)?;
            self.metrics.increment_responses_drafted();

            tracing::info!(
                event = %Event::ResponseDrafted,
                incident_id = %id,
                first_draft = first,
                "response draft stored"
            );
            Ok(stored)
        })
    }

    /// Close the incident. Closing twice fails.
    pub fn close(&self, id: IncidentId) -> TrackerResult<Incident> {
        self.mutate(id, |incident| {
            incident.close(self.clock.now())?;
            let stored = self.store.update_incident(incident)?;
            self.ledger.record_closed(id)?;

            tracing::info!(event = %Event::IncidentClosed, incident_id = %id, "incident closed");
            Ok(stored)
        })
    }

    // =========================================================================
    // HASH CHAIN
    // =========================================================================

    /// Append an analysis of the incident to the hash chain.
    pub fn seal_analysis(
        &self,
        id: IncidentId,
        analysis: &AnalysisRecord,
    ) -> TrackerResult<LedgerEntry> {
        self.locks.with(LockKey::Id(id), || {
            self.get_incident(id)?;
            let data = json!({ "incident_id": id, "analysis": analysis });
            let subject = format!("analysis:incident:{}", id);
            Ok(self.chain.append(Some(&subject), &data)?)
        })
    }

    pub fn verify_chain(&self) -> TrackerResult<ChainVerification> {
        Ok(self.chain.verify()?)
    }

    /// Load the incident under its lock, hand it to `f`, and return what
    /// `f` returns. `f` is responsible for persisting any change.
    pub(super) fn mutate<T>(
        &self,
        id: IncidentId,
        f: impl FnOnce(&mut Incident) -> TrackerResult<T>,
    ) -> TrackerResult<T> {
        self.locks.with(LockKey::Id(id), || {
            let mut incident = self.get_incident(id)?;
            f(&mut incident)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::incident::TransitionError;
    use crate::ledger::EventType;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    fn tracker() -> (Arc<ManualClock>, IncidentTracker<MemoryStore>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));
        let tracker = IncidentTracker::with_clock(Arc::new(MemoryStore::new()), clock.clone());
        (clock, tracker)
    }

    fn event_types(tracker: &IncidentTracker<MemoryStore>, id: IncidentId) -> Vec<EventType> {
        tracker
            .get_timeline(id)
            .unwrap()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }

    #[test]
    fn test_open_records_detection() {
        let (_, tracker) = tracker();
        let incident = tracker
            .open_incident("Recall rumour", "reddit", RiskLevel::Medium)
            .unwrap();

        assert_eq!(incident.status, IncidentStatus::Open);
        let timeline = tracker.get_timeline(incident.id).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].description, "Incident detected from source: reddit");
        assert_eq!(tracker.metrics().incidents_opened, 1);
    }

    #[test]
    fn test_alert_recorded_once() {
        let (clock, tracker) = tracker();
        let id = tracker.open_incident("t", "news", RiskLevel::High).unwrap().id;

        assert!(tracker.alert(id).unwrap());
        let first = tracker.get_incident(id).unwrap().alerted_at;
        clock.advance(Duration::minutes(1));
        assert!(!tracker.alert(id).unwrap());

        assert_eq!(tracker.get_incident(id).unwrap().alerted_at, first);
        assert_eq!(event_types(&tracker, id), vec![EventType::Detected, EventType::Alerted]);
    }

    #[test]
    fn test_evaluate_alert_uses_policy() {
        let (_, tracker) = tracker();
        let low = tracker.open_incident("a", "web", RiskLevel::Low).unwrap().id;
        let medium = tracker.open_incident("b", "web", RiskLevel::Medium).unwrap().id;

        assert!(!tracker.evaluate_alert(low, 100).unwrap());
        assert!(!tracker.evaluate_alert(medium, 2).unwrap());
        assert!(tracker.evaluate_alert(medium, 3).unwrap());
    }

    #[test]
    fn test_escalate_only_upwards() {
        let (_, tracker) = tracker();
        let id = tracker.open_incident("t", "news", RiskLevel::Medium).unwrap().id;

        assert!(!tracker.escalate(id, RiskLevel::Low).unwrap());
        assert!(!tracker.escalate(id, RiskLevel::Medium).unwrap());
        assert!(tracker.escalate(id, RiskLevel::High).unwrap());

        let timeline = tracker.get_timeline(id).unwrap();
        assert_eq!(timeline.last().unwrap().description, "Risk escalated from medium to high");
        assert_eq!(tracker.get_incident(id).unwrap().risk_level, RiskLevel::High);
    }

    #[test]
    fn test_monitoring_only_from_open() {
        let (_, tracker) = tracker();
        let id = tracker.open_incident("t", "news", RiskLevel::Low).unwrap().id;

        assert!(tracker.enter_monitoring(id).unwrap());
        assert!(!tracker.enter_monitoring(id).unwrap());
        tracker.record_response(id, "draft").unwrap();
        assert!(!tracker.enter_monitoring(id).unwrap());

        assert_eq!(
            tracker.get_incident(id).unwrap().status,
            IncidentStatus::Responded
        );
        assert_eq!(
            event_types(&tracker, id),
            vec![
                EventType::Detected,
                EventType::StatusChanged,
                EventType::ResponseDrafted
            ]
        );
    }

    #[test]
    fn test_response_redraft_keeps_first_timestamp() {
        let (clock, tracker) = tracker();
        let id = tracker.open_incident("t", "news", RiskLevel::Low).unwrap().id;

        let first = tracker.record_response(id, "one").unwrap();
        clock.advance(Duration::minutes(5));
        let second = tracker.record_response(id, "two").unwrap();

        assert_eq!(second.response_drafted_at, first.response_drafted_at);
        assert_eq!(second.response_draft.as_deref(), Some("two"));
        assert_eq!(second.status, IncidentStatus::Responded);
        assert_eq!(tracker.metrics().responses_drafted, 2);
    }

    #[test]
    fn test_closed_is_terminal() {
        let (_, tracker) = tracker();
        let id = tracker.open_incident("t", "news", RiskLevel::Low).unwrap().id;
        let closed = tracker.close(id).unwrap();
        assert!(closed.closed_at.is_some());

        for result in [
            tracker.close(id).map(|_| ()),
            tracker.alert(id).map(|_| ()),
            tracker.record_response(id, "late").map(|_| ()),
            tracker.escalate(id, RiskLevel::High).map(|_| ()),
            tracker.enter_monitoring(id).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(TrackerError::Transition(TransitionError::Closed { .. }))
            ));
        }

        let after = tracker.get_incident(id).unwrap();
        assert_eq!(after, closed);
        assert_eq!(event_types(&tracker, id), vec![EventType::Detected, EventType::Closed]);
    }

    #[test]
    fn test_unknown_incident() {
        let (_, tracker) = tracker();
        assert!(matches!(
            tracker.alert(IncidentId(42)),
            Err(TrackerError::IncidentNotFound(IncidentId(42)))
        ));
        assert!(tracker.get_timeline(IncidentId(42)).is_err());
    }

    #[test]
    fn test_seal_analysis_links_entries() {
        let (_, tracker) = tracker();
        let id = tracker.open_incident("t", "news", RiskLevel::Low).unwrap().id;

        let first = tracker.seal_analysis(id, &AnalysisRecord::default()).unwrap();
        let second = tracker.seal_analysis(id, &AnalysisRecord::default()).unwrap();

        assert!(first.is_genesis());
        assert_eq!(second.prev_hash.as_deref(), Some(first.hash.as_str()));
        assert_eq!(first.subject.as_deref(), Some("analysis:incident:1"));
        assert_eq!(first.data["analysis"]["claim"], "No Claim Extracted");
        assert!(tracker.verify_chain().unwrap().is_intact());
    }

    #[test]
    fn test_seal_analysis_requires_incident() {
        let (_, tracker) = tracker();
        assert!(tracker
            .seal_analysis(IncidentId(5), &AnalysisRecord::default())
            .is_err());
        assert!(tracker.chain().entries().unwrap().is_empty());
    }
}
