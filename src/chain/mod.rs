//! Hash chain
//!
//! Tamper evidence for content-bearing records. Each entry's digest covers
//! its own data and the digest of the entry before it, so editing any entry
//! breaks every link after it.
//!
//! - `canonical`: deterministic JSON rendering fed to the digest
//! - `hash`: `compute_hash(prev, data)`
//! - `appender`: `HashChain`, the serialised writer
//! - `verify`: walk from genesis and report the first tampered entry
//!
//! This is a local mechanism. It is not replicated and involves no
//! consensus.

mod appender;
mod canonical;
mod entry;
mod hash;
mod verify;

pub use appender::HashChain;
pub use canonical::{canonical_json, to_canonical_value};
pub use entry::{LedgerEntry, NewLedgerEntry};
pub use hash::{compute_hash, is_well_formed, link_payload, HASH_HEX_LEN};
pub use verify::{verify_entries, ChainVerification, TamperReason, TamperedEntry};
