//! Observability subsystem for neurochain
//!
//! - Structured logging through `tracing`, one closed event vocabulary
//! - Monotonic counters
//!
//! Observability is read-only: nothing here feeds back into incident state.
//!
//! # Usage
//!
//! ```ignore
//! use neurochain::observability::{init_logging, Event, MetricsRegistry};
//!
//! init_logging("info", false)?;
//! tracing::info!(event = %Event::IncidentOpened, incident_id = 7, "incident opened");
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_incidents_opened();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{build_filter, init_logging};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use thiserror::Error;

/// Observability errors. Never fatal to the core.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("logging already initialised: {0}")]
    AlreadyInitialized(String),
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;
