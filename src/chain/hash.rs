//! Chain link digest
//!
//! `hash = sha256(canonical_json({"data": data, "prev": prev_hash}))`,
//! rendered as 64 lowercase hex characters. The genesis entry links to
//! `null`.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::canonical::{canonical_json, to_canonical_value};

/// Length of a rendered digest.
pub const HASH_HEX_LEN: usize = 64;

/// Build the canonical text that is fed to the digest.
pub fn link_payload<T: Serialize + ?Sized>(prev_hash: Option<&str>, data: &T) -> String {
    let mut payload = Map::new();
    payload.insert(
        "prev".to_string(),
        prev_hash.map_or(Value::Null, |h| Value::String(h.to_string())),
    );
    payload.insert("data".to_string(), to_canonical_value(data));
    canonical_json(&Value::Object(payload))
}

/// Compute the link hash for `data` chained onto `prev_hash`.
///
/// Total: every input has a defined rendering, so this never fails.
pub fn compute_hash<T: Serialize + ?Sized>(prev_hash: Option<&str>, data: &T) -> String {
    let payload = link_payload(prev_hash, data);
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// True if `s` looks like a digest produced by `compute_hash`.
pub fn is_well_formed(s: &str) -> bool {
    s.len() == HASH_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
