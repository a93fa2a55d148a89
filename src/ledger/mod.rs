//! Event ledger
//!
//! The audit trail of incident lifecycle facts. Events are appended once
//! and never edited or removed. The six `EventType` literals are a stable
//! contract with external tooling.

mod event;
mod writer;

pub use event::{EventType, IncidentEvent, NewIncidentEvent};
pub use writer::EventLedger;
