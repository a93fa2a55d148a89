//! Incident state machine
//!
//! - Transitions are explicit methods, never inferred
//! - Timestamps are supplied by the caller
//! - `closed` is terminal: every mutation of a closed incident fails and
//!   leaves it untouched
//! - `alerted_at` and `response_drafted_at` are set at most once

use chrono::{DateTime, Utc};

use super::errors::{TransitionError, TransitionResult};
use super::model::{Incident, IncidentStatus};
use crate::priority::RiskLevel;

impl Incident {
    fn ensure_not_closed(&self, action: &'static str) -> TransitionResult<()> {
        if self.status.is_terminal() {
            return Err(TransitionError::Closed {
                id: self.id,
                action,
            });
        }
        Ok(())
    }

    /// Record that the incident crossed the alert threshold.
    ///
    /// Returns `true` only on the first effective call.
    pub fn mark_alerted(&mut self, now: DateTime<Utc>) -> TransitionResult<bool> {
        self.ensure_not_closed("mark alerted")?;
        if self.alerted_at.is_some() {
            return Ok(false);
        }
        self.alerted_at = Some(now);
        Ok(true)
    }

    /// open → monitoring.
    ///
    /// No-op from `monitoring` or `responded`; a responded incident never
    /// falls back to monitoring.
    pub fn enter_monitoring(&mut self) -> TransitionResult<bool> {
        self.ensure_not_closed("enter monitoring")?;
        if !self.status.allows(IncidentStatus::Monitoring) {
            return Ok(false);
        }
        self.status = IncidentStatus::Monitoring;
        Ok(true)
    }

    /// Apply a freshly generated response draft.
    ///
    /// The draft text always replaces the previous one; the timestamp is
    /// only set the first time. Returns `true` on the first draft.
    pub fn mark_responded(
        &mut self,
        draft: impl Into<String>,
        now: DateTime<Utc>,
    ) -> TransitionResult<bool> {
        self.ensure_not_closed("mark responded")?;
        let first = self.response_drafted_at.is_none();
        if first {
            self.response_drafted_at = Some(now);
        }
        self.response_draft = Some(draft.into());
        self.status = IncidentStatus::Responded;
        Ok(first)
    }

    /// Raise the risk level.
    ///
    /// Returns the previous level if `to` is strictly higher, `None` if the
    /// incident is already at or above `to`.
    pub fn escalate(&mut self, to: RiskLevel) -> TransitionResult<Option<RiskLevel>> {
        self.ensure_not_closed("escalate")?;
        if !self.risk_level.is_escalation_to(to) {
            return Ok(None);
        }
        let from = self.risk_level;
        self.risk_level = to;
        Ok(Some(from))
    }

    /// Close the incident. Fails if it is already closed.
    pub fn close(&mut self, now: DateTime<Utc>) -> TransitionResult<()> {
        self.ensure_not_closed("close")?;
        self.status = IncidentStatus::Closed;
        self.closed_at = Some(now);
        Ok(())
    }
}
