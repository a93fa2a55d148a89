//! Persistence collaborator interface
//!
//! The core never talks to a database directly. It consumes these narrow
//! traits, and every method is one atomic unit: once it returns `Ok`, the
//! whole change is visible to other callers, and on `Err` nothing is.
//!
//! - `IncidentStore`: append, query by filter, update with refresh
//! - `EventStore`: append-only lifecycle events
//! - `ChainStore`: append-only hash-chain entries; an entry that does not
//!   link to the current tip is rejected, so the chain cannot fork
//!
//! Two implementations are provided: `MemoryStore` and the durable
//! `FileStore`.

mod errors;
mod file;
mod memory;
mod state;

pub use errors::{StoreError, StoreResult};
pub use file::{FileStore, LOCK_FILE_NAME, STORE_FILE_NAME};
pub use memory::MemoryStore;
pub use state::StoreState;

use crate::chain::{LedgerEntry, NewLedgerEntry};
use crate::incident::{Incident, IncidentId, NewIncident};
use crate::ledger::{IncidentEvent, NewIncidentEvent};

/// Incident persistence.
pub trait IncidentStore: Send + Sync {
    /// Persist a new incident and return it with its assigned id.
    fn insert_incident(&self, new: NewIncident) -> StoreResult<Incident>;

    fn get_incident(&self, id: IncidentId) -> StoreResult<Option<Incident>>;

    /// Look up by `(title, source)`; the title is truncated before matching.
    fn find_incident(&self, title: &str, source: &str) -> StoreResult<Option<Incident>>;

    /// Replace an existing incident and return the stored copy.
    fn update_incident(&self, incident: &Incident) -> StoreResult<Incident>;

    fn list_incidents(&self) -> StoreResult<Vec<Incident>>;
}

/// Lifecycle event persistence. Append-only.
pub trait EventStore: Send + Sync {
    /// Persist an event, assigning the next global sequence number.
    fn append_event(&self, new: NewIncidentEvent) -> StoreResult<IncidentEvent>;

    /// All events of one incident, in append order.
    fn events_for(&self, incident_id: IncidentId) -> StoreResult<Vec<IncidentEvent>>;
}

/// Hash-chain persistence. Append-only.
pub trait ChainStore: Send + Sync {
    /// Persist an entry. Fails with `ChainConflict` unless
    /// `new.prev_hash` equals the hash of the current last entry.
    fn append_entry(&self, new: NewLedgerEntry) -> StoreResult<LedgerEntry>;

    fn last_entry(&self) -> StoreResult<Option<LedgerEntry>>;

    /// All entries in append order.
    fn entries(&self) -> StoreResult<Vec<LedgerEntry>>;
}

/// Everything the tracker needs.
pub trait Store: IncidentStore + EventStore + ChainStore {}

impl<T: IncidentStore + EventStore + ChainStore> Store for T {}
