//! Hash-chain entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::hash::compute_hash;

/// One link in the tamper-evidence chain.
///
/// `hash` covers `{prev: prev_hash, data}` only; `sequence`, `subject` and
/// `timestamp` are bookkeeping and are not protected by the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Global append position, starting at 1
    pub sequence: u64,
    /// What the data describes, e.g. `analysis:post:42`
    pub subject: Option<String>,
    /// The protected content
    pub data: Value,
    /// Digest of this entry
    pub hash: String,
    /// Digest of the previous entry; `None` for genesis
    pub prev_hash: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_none()
    }

    /// Re-derive this entry's digest from its stored data and the given
    /// predecessor digest.
    pub fn recompute_hash(&self, prev_hash: Option<&str>) -> String {
        compute_hash(prev_hash, &self.data)
    }
}

/// An entry that has been hashed but not yet assigned a sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
    pub subject: Option<String>,
    pub data: Value,
    pub hash: String,
    pub prev_hash: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NewLedgerEntry {
    /// Hash `data` onto `prev_hash`.
    pub fn link(
        prev_hash: Option<String>,
        subject: Option<String>,
        data: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let hash = compute_hash(prev_hash.as_deref(), &data);
        Self {
            subject,
            data,
            hash,
            prev_hash,
            timestamp,
        }
    }

    pub fn into_entry(self, sequence: u64) -> LedgerEntry {
        LedgerEntry {
            sequence,
            subject: self.subject,
            data: self.data,
            hash: self.hash,
            prev_hash: self.prev_hash,
            timestamp: self.timestamp,
        }
    }
}
