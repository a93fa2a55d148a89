//! Incident tracker
//!
//! The one place that mutates incidents. Combines the state machine, the
//! event ledger and the hash chain, serialises writers per incident, and
//! implements the full scoring pipeline.

mod errors;
mod lifecycle;
mod locks;
mod pipeline;

pub use errors::{TrackerError, TrackerResult};
pub use lifecycle::IncidentTracker;
