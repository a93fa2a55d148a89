//! Tracker errors

use thiserror::Error;

use crate::incident::{IncidentId, TransitionError};
use crate::responder::GenerationError;
use crate::store::StoreError;

/// Failure of a tracker operation.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("incident {0} not found")]
    IncidentNotFound(IncidentId),
}

impl TrackerError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::Store(e) => e.code(),
            TrackerError::Transition(e) => e.code(),
            TrackerError::Generation(e) => e.code(),
            TrackerError::IncidentNotFound(_) => "NC_INCIDENT_NOT_FOUND",
        }
    }
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
