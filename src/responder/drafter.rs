//! Response drafting and claim analysis
//!
//! The generator is called outside any incident lock; only its result is
//! applied under the lock. A failed or empty generation leaves the
//! incident untouched.

use std::sync::Arc;

use super::errors::GenerationError;
use super::generator::TextGenerator;
use super::reply::parse_json_response;
use crate::analysis::AnalysisRecord;
use crate::chain::LedgerEntry;
use crate::incident::{Incident, IncidentId, TransitionError};
use crate::store::Store;
use crate::tracker::{IncidentTracker, TrackerResult};

pub struct ResponseDrafter<S: Store> {
    tracker: Arc<IncidentTracker<S>>,
    generator: Arc<dyn TextGenerator>,
}

impl<S: Store> ResponseDrafter<S> {
    pub fn new(tracker: Arc<IncidentTracker<S>>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { tracker, generator }
    }

    /// Generate a response for the incident and store it as the latest
    /// draft.
    pub fn draft(&self, incident_id: IncidentId, prompt: &str) -> TrackerResult<Incident> {
        self.ensure_open(incident_id, "mark responded")?;

        let text = self.generator.generate(prompt)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyReply.into());
        }

        self.tracker.record_response(incident_id, text)
    }

    /// Ask for a claim analysis and seal the parsed result into the hash
    /// chain. Unparseable replies are sealed with default fields.
    pub fn analyse(
        &self,
        incident_id: IncidentId,
        prompt: &str,
    ) -> TrackerResult<(AnalysisRecord, LedgerEntry)> {
        self.tracker.get_incident(incident_id)?;

        let reply = parse_json_response(self.generator.generate(prompt)?.trim());
        let record = AnalysisRecord::from_reply(&reply);
        let entry = self.tracker.seal_analysis(incident_id, &record)?;
        Ok((record, entry))
    }

    /// Skip the generator for incidents that cannot take a draft.
    fn ensure_open(&self, incident_id: IncidentId, action: &'static str) -> TrackerResult<()> {
        let incident = self.tracker.get_incident(incident_id)?;
        if incident.status.is_terminal() {
            return Err(TransitionError::Closed {
                id: incident_id,
                action,
            }
            .into());
        }
        Ok(())
    }
}
