use log::warn;
use thiserror::Error;

use super::Block;

/// Why a block or chain failed validation. Each variant carries the
/// expected/actual values for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("block index invalid: expected {expected}, got {actual}")]
    IndexMismatch { expected: u64, actual: u64 },

    #[error("previous block hash invalid: expected {expected}, got {actual}")]
    BrokenLink { expected: String, actual: String },

    #[error("block hash invalid: expected {expected}, got {actual}")]
    ContentHashMismatch { expected: String, actual: String },

    #[error("chain is empty")]
    EmptyChain,

    #[error("chain does not start at the genesis block")]
    GenesisMismatch,
}

/// Check that `candidate` is a valid successor of `prev`.
///
/// Checks run in order and stop at the first failure: index continuity,
/// hash linkage, then the content commitment (recomputed and compared
/// against the cached `hash`).
pub fn validate_successor(prev: &Block, candidate: &Block) -> Result<(), ValidationError> {
    if candidate.index != prev.index + 1 {
        let err = ValidationError::IndexMismatch {
            expected: prev.index + 1,
            actual: candidate.index,
        };
        warn!("block rejected: {err}");
        return Err(err);
    }

    if candidate.previous_hash != prev.hash {
        let err = ValidationError::BrokenLink {
            expected: prev.hash.clone(),
            actual: candidate.previous_hash.clone(),
        };
        warn!("block rejected: {err}");
        return Err(err);
    }

    let expected = candidate.compute_hash();
    if candidate.hash != expected {
        let err = ValidationError::ContentHashMismatch {
            expected,
            actual: candidate.hash.clone(),
        };
        warn!("block rejected: {err}");
        return Err(err);
    }

    Ok(())
}

/// Validate a whole chain: the first block must be the genesis block,
/// then every adjacent pair must pass [`validate_successor`]. Stops at
/// the first failing pair.
pub fn validate_chain(chain: &[Block]) -> Result<(), ValidationError> {
    let first = chain.first().ok_or(ValidationError::EmptyChain)?;
    if *first != Block::genesis() {
        warn!("chain rejected: first block is not genesis");
        return Err(ValidationError::GenesisMismatch);
    }

    for pair in chain.windows(2) {
        validate_successor(&pair[0], &pair[1])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_chain, validate_successor, ValidationError};
    use crate::blockchain::Block;

    fn chain_of(len: usize) -> Vec<Block> {
        let mut chain = vec![Block::genesis()];
        for i in 1..len {
            let head = chain.last().unwrap();
            chain.push(Block::next_candidate(head, format!("payload {i}"), i as i64));
        }
        chain
    }

    #[test]
    fn accepts_a_well_formed_chain() {
        assert_eq!(validate_chain(&chain_of(4)), Ok(()));
    }

    #[test]
    fn rejects_empty_chain() {
        assert_eq!(validate_chain(&[]), Err(ValidationError::EmptyChain));
    }

    #[test]
    fn rejects_foreign_genesis() {
        let mut chain = chain_of(2);
        chain[0].payload = "not genesis".into();
        assert_eq!(validate_chain(&chain), Err(ValidationError::GenesisMismatch));
    }

    #[test]
    fn rejects_index_gap() {
        let genesis = Block::genesis();
        let mut b = Block::next_candidate(&genesis, "data", 1);
        b.index = 5;
        assert_eq!(
            validate_successor(&genesis, &b),
            Err(ValidationError::IndexMismatch {
                expected: 1,
                actual: 5
            })
        );
    }

    #[test]
    fn rejects_broken_link() {
        let genesis = Block::genesis();
        let mut b = Block::next_candidate(&genesis, "data", 1);
        b.previous_hash = "f".repeat(64);
        let err = validate_successor(&genesis, &b).unwrap_err();
        assert!(matches!(err, ValidationError::BrokenLink { expected, .. }
            if expected == genesis.hash));
    }

    #[test]
    fn rejects_tampered_content() {
        let genesis = Block::genesis();
        let mut b = Block::next_candidate(&genesis, "data", 1);
        b.payload = "tampered".into();
        assert!(matches!(
            validate_successor(&genesis, &b),
            Err(ValidationError::ContentHashMismatch { .. })
        ));
    }

    // Flipping any single field of a middle block must fail the chain at
    // or before that block.
    #[test]
    fn tampering_any_field_of_a_middle_block_fails_the_chain() {
        let pristine = chain_of(3);

        let mut c = pristine.clone();
        c[1].payload = "rewritten".into();
        assert!(validate_chain(&c).is_err());

        let mut c = pristine.clone();
        c[1].hash = "0".repeat(64);
        assert!(validate_chain(&c).is_err());

        let mut c = pristine.clone();
        c[1].previous_hash = "1".repeat(64);
        assert!(validate_chain(&c).is_err());

        let mut c = pristine.clone();
        c[1].index = 2;
        assert!(validate_chain(&c).is_err());
    }
}
