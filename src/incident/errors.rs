//! State machine errors

use thiserror::Error;

use super::model::IncidentId;

/// A lifecycle transition that is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("incident {id} is closed; cannot {action}")]
    Closed { id: IncidentId, action: &'static str },
}

impl TransitionError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::Closed { .. } => "NC_INCIDENT_CLOSED",
        }
    }
}

/// Result type for state machine operations
pub type TransitionResult<T> = Result<T, TransitionError>;
