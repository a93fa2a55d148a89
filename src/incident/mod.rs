//! Incident entity and lifecycle
//!
//! States: `open → monitoring → responded → closed`. The lifecycle is not
//! strictly linear (a draft can be produced straight from `open`), but
//! `closed` is terminal.

mod errors;
mod model;
mod state;

pub use errors::{TransitionError, TransitionResult};
pub use model::{
    truncate_title, Incident, IncidentId, IncidentStatus, NewIncident, TITLE_MAX_CHARS,
};
