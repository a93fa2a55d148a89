//! Incident entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::priority::RiskLevel;

/// Titles longer than this are truncated on creation.
pub const TITLE_MAX_CHARS: usize = 512;

/// Stable incident identifier, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(pub u64);

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incident lifecycle status.
///
/// Allowed moves:
///
/// | from | to |
/// |---|---|
/// | open | monitoring |
/// | open, monitoring, responded | responded |
/// | open, monitoring, responded | closed |
///
/// `closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Monitoring,
    Responded,
    Closed,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::Monitoring => "monitoring",
            IncidentStatus::Responded => "responded",
            IncidentStatus::Closed => "closed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IncidentStatus::Closed)
    }

    /// Whether a transition from `self` into `to` is part of the lifecycle.
    pub fn allows(&self, to: IncidentStatus) -> bool {
        use IncidentStatus::*;
        match (self, to) {
            (Closed, _) => false,
            (Open, Monitoring) => true,
            (_, Responded) => true,
            (_, Closed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IncidentStatus::Open),
            "monitoring" => Ok(IncidentStatus::Monitoring),
            "responded" => Ok(IncidentStatus::Responded),
            "closed" => Ok(IncidentStatus::Closed),
            other => Err(format!("unknown incident status: '{}'", other)),
        }
    }
}

/// One tracked situation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub title: String,
    /// Origin tag (news, reddit, youtube, web, ...)
    pub source: String,
    pub risk_level: RiskLevel,
    /// Numeric refinement, independent of `risk_level`
    pub risk_score: Option<f64>,
    pub status: IncidentStatus,
    pub opened_at: DateTime<Utc>,
    pub alerted_at: Option<DateTime<Utc>>,
    pub response_drafted_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Latest generated response text
    pub response_draft: Option<String>,
}

/// Fields supplied when creating an incident; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub title: String,
    pub source: String,
    pub risk_level: RiskLevel,
    pub risk_score: Option<f64>,
    pub opened_at: DateTime<Utc>,
}

impl NewIncident {
    pub fn new(
        title: &str,
        source: &str,
        risk_level: RiskLevel,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: truncate_title(title),
            source: source.to_string(),
            risk_level,
            risk_score: None,
            opened_at,
        }
    }

    pub fn with_risk_score(mut self, score: f64) -> Self {
        self.risk_score = Some(score);
        self
    }

    pub fn into_incident(self, id: IncidentId) -> Incident {
        Incident {
            id,
            title: self.title,
            source: self.source,
            risk_level: self.risk_level,
            risk_score: self.risk_score,
            status: IncidentStatus::Open,
            opened_at: self.opened_at,
            alerted_at: None,
            response_drafted_at: None,
            closed_at: None,
            response_draft: None,
        }
    }
}

/// Truncate to at most `TITLE_MAX_CHARS` characters (not bytes).
pub fn truncate_title(title: &str) -> String {
    match title.char_indices().nth(TITLE_MAX_CHARS) {
        Some((byte_idx, _)) => title[..byte_idx].to_string(),
        None => title.to_string(),
    }
}
