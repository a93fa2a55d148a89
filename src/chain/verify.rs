//! Chain verification
//!
//! Walk from genesis, re-deriving every digest from the stored data and the
//! previous entry's stored digest. The first disagreement is the earliest
//! point of tampering: it and everything after it are untrusted, everything
//! before it stays verified.

use serde::Serialize;

use super::entry::LedgerEntry;

/// Why an entry failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TamperReason {
    /// Stored `prev_hash` does not name the preceding entry.
    BrokenLink {
        expected: Option<String>,
        found: Option<String>,
    },
    /// Stored `hash` does not match the recomputed digest.
    HashMismatch { stored: String, recomputed: String },
}

/// The earliest tampered entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TamperedEntry {
    /// Zero-based position in append order
    pub index: usize,
    pub sequence: u64,
    pub reason: TamperReason,
}

/// Outcome of verifying a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainVerification {
    /// Number of entries inspected
    pub total: usize,
    /// Number of leading entries that verified
    pub verified: usize,
    pub first_tampered: Option<TamperedEntry>,
}

impl ChainVerification {
    pub fn is_intact(&self) -> bool {
        self.first_tampered.is_none()
    }

    /// Number of entries at or after the tamper point.
    pub fn untrusted(&self) -> usize {
        self.total - self.verified
    }
}

/// Verify entries given in append order.
pub fn verify_entries(entries: &[LedgerEntry]) -> ChainVerification {
    let mut prev: Option<&str> = None;

    for (index, entry) in entries.iter().enumerate() {
        if entry.prev_hash.as_deref() != prev {
            return tampered_at(
                entries.len(),
                index,
                entry,
                TamperReason::BrokenLink {
                    expected: prev.map(str::to_string),
                    found: entry.prev_hash.clone(),
                },
            );
        }

        let recomputed = entry.recompute_hash(prev);
        if recomputed != entry.hash {
            return tampered_at(
                entries.len(),
                index,
                entry,
                TamperReason::HashMismatch {
                    stored: entry.hash.clone(),
                    recomputed,
                },
            );
        }

        prev = Some(entry.hash.as_str());
    }

    ChainVerification {
        total: entries.len(),
        verified: entries.len(),
        first_tampered: None,
    }
}

fn tampered_at(
    total: usize,
    index: usize,
    entry: &LedgerEntry,
    reason: TamperReason,
) -> ChainVerification {
    ChainVerification {
        total,
        verified: index,
        first_tampered: Some(TamperedEntry {
            index,
            sequence: entry.sequence,
            reason,
        }),
    }
}
