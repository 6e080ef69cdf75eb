use std::fmt;

use serde::{Deserialize, Serialize};

use super::hash::commit;
use super::{GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH};

/// A single block in the chain holding one opaque piece of payload text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub payload: String,
    pub hash: String, // Cached commitment over the other four fields
    pub previous_hash: String,
}

impl Block {
    /// The fixed genesis block. Every call yields a bit-identical value.
    pub fn genesis() -> Self {
        Self {
            index: 0,
            timestamp: 0,
            payload: GENESIS_PAYLOAD.to_string(),
            hash: commit(0, 0, GENESIS_PAYLOAD, GENESIS_PREVIOUS_HASH),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    /// Build the candidate that would extend `head` with `payload` at
    /// time `now`. The hash commits to the fields exactly as they are
    /// here; the proof-of-work solved before the candidate is accepted
    /// does not feed back into it.
    pub fn next_candidate(head: &Block, payload: impl Into<String>, now: i64) -> Self {
        let payload = payload.into();
        let index = head.index + 1;
        let hash = commit(index, now, &payload, &head.hash);
        Self {
            index,
            timestamp: now,
            payload,
            hash,
            previous_hash: head.hash.clone(),
        }
    }

    /// Recompute the commitment from this block's own fields
    /// (excluding the cached `hash` itself).
    pub fn compute_hash(&self) -> String {
        commit(self.index, self.timestamp, &self.payload, &self.previous_hash)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        writeln!(f, "Payload: {}", self.payload)?;
        writeln!(f, "Hash: {}", self.hash)?;
        writeln!(f, "Previous hash: {}", self.previous_hash)
    }
}
