//! Observable events for neurochain
//!
//! Every log line carries one of these names in its `event` field so that
//! downstream tooling can match on a closed vocabulary instead of free text.

use std::fmt;

/// Observable events emitted by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Incident lifecycle
    /// Incident created on first detection
    IncidentOpened,
    /// Incident crossed the alert threshold
    IncidentAlerted,
    /// Incident risk level raised
    IncidentEscalated,
    /// Incident moved into monitoring
    IncidentMonitoring,
    /// Response draft applied to an incident
    ResponseDrafted,
    /// Incident closed
    IncidentClosed,

    // Ledger
    /// Lifecycle event appended to the ledger
    LedgerEventRecorded,

    // Hash chain
    /// Entry appended to the hash chain
    ChainAppended,
    /// Full chain verification passed
    ChainVerified,
    /// Chain verification found a tampered entry
    ChainTampered,

    // Scoring
    /// Scorer returned the safe default
    ScoreFallback,

    // Store
    /// Store snapshot committed to disk
    StoreCommitted,
    /// Store snapshot loaded from disk
    StoreLoaded,

    // Generated text
    /// Generated reply could not be parsed as JSON
    ReplyParseFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::IncidentOpened => "INCIDENT_OPENED",
            Event::IncidentAlerted => "INCIDENT_ALERTED",
            Event::IncidentEscalated => "INCIDENT_ESCALATED",
            Event::IncidentMonitoring => "INCIDENT_MONITORING",
            Event::ResponseDrafted => "RESPONSE_DRAFTED",
            Event::IncidentClosed => "INCIDENT_CLOSED",

            Event::LedgerEventRecorded => "LEDGER_EVENT_RECORDED",

            Event::ChainAppended => "CHAIN_APPENDED",
            Event::ChainVerified => "CHAIN_VERIFIED",
            Event::ChainTampered => "CHAIN_TAMPERED",

            Event::ScoreFallback => "SCORE_FALLBACK",

            Event::StoreCommitted => "STORE_COMMITTED",
            Event::StoreLoaded => "STORE_LOADED",

            Event::ReplyParseFailed => "REPLY_PARSE_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::IncidentOpened,
            Event::IncidentAlerted,
            Event::IncidentEscalated,
            Event::IncidentMonitoring,
            Event::ResponseDrafted,
            Event::IncidentClosed,
            Event::LedgerEventRecorded,
            Event::ChainAppended,
            Event::ChainVerified,
            Event::ChainTampered,
            Event::ScoreFallback,
            Event::StoreCommitted,
            Event::StoreLoaded,
            Event::ReplyParseFailed,
        ];

        for event in events {
            let name = event.as_str();
            assert!(name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }
}
