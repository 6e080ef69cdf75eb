use sha2::{Digest, Sha256};

/// Compute the SHA-256 commitment over a block's fields, rendered as
/// lowercase hex. The preimage is the plain concatenation
/// `{index}{timestamp}{payload}{previous_hash}`; the digest is what a
/// block stores in its `hash` field and what validation recomputes.
pub fn commit(index: u64, timestamp: i64, payload: &str, previous_hash: &str) -> String {
    let preimage = format!("{index}{timestamp}{payload}{previous_hash}");
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}
