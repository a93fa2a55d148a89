//! Ledger event records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::incident::IncidentId;

/// Canonical event types.
///
/// The string literals are matched by external tooling and must never be
/// renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Detected,
    Alerted,
    Escalated,
    ResponseDrafted,
    StatusChanged,
    Closed,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Detected,
        EventType::Alerted,
        EventType::Escalated,
        EventType::ResponseDrafted,
        EventType::StatusChanged,
        EventType::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Detected => "detected",
            EventType::Alerted => "alerted",
            EventType::Escalated => "escalated",
            EventType::ResponseDrafted => "response_drafted",
            EventType::StatusChanged => "status_changed",
            EventType::Closed => "closed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: '{}'", s))
    }
}

/// One immutable fact in an incident's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentEvent {
    /// Global append order, starting at 1; breaks timestamp ties
    pub sequence: u64,
    pub incident_id: IncidentId,
    pub event_type: EventType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// An event before the store assigns its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncidentEvent {
    pub incident_id: IncidentId,
    pub event_type: EventType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl NewIncidentEvent {
    pub fn into_event(self, sequence: u64) -> IncidentEvent {
        IncidentEvent {
            sequence,
            incident_id: self.incident_id,
            event_type: self.event_type,
            description: self.description,
            created_at: self.created_at,
        }
    }
}
