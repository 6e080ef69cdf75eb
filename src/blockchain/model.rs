use chrono::Utc;
use log::info;
use thiserror::Error;

use super::validate::{validate_chain, validate_successor, ValidationError};
use super::Block;
use crate::pow::{CancelToken, NoopObserver, ProofOfWork, SolveObserver, SolveOutcome};

/// Why an append or a wholesale replacement was refused. The chain is
/// left unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The locally built candidate failed the defensive successor check.
    #[error("new block rejected: {0}")]
    AppendRejected(#[source] ValidationError),

    /// An incoming chain failed validation.
    #[error("incoming chain rejected: {0}")]
    ChainRejected(#[source] ValidationError),

    /// An incoming chain was valid but not strictly longer. Ties keep
    /// the local chain.
    #[error("incoming chain not longer than current ({candidate} <= {current} blocks)")]
    ChainNotLonger { candidate: usize, current: usize },

    /// The proof-of-work search was cancelled before a nonce was found.
    #[error("proof of work cancelled")]
    Cancelled,
}

/// In-memory blockchain with proof-of-work gated appends and
/// longest-valid-chain fork resolution.
///
/// All mutation goes through `&mut self`, so at most one of
/// [`append_payload`](Self::append_payload) and
/// [`replace_with`](Self::replace_with) can ever be in flight. Callers
/// sharing a chain across threads wrap it in a `Mutex`.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    pow: ProofOfWork,
}

impl Blockchain {
    /// A chain holding only the genesis block, with a fresh puzzle
    /// engine.
    pub fn new() -> Self {
        Self::with_engine(ProofOfWork::new())
    }

    /// A genesis-only chain driven by a caller-configured engine.
    pub fn with_engine(pow: ProofOfWork) -> Self {
        Self {
            chain: vec![Block::genesis()],
            pow,
        }
    }

    /// The current head block.
    pub fn head(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// All blocks in order, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Current difficulty prefix of the puzzle engine.
    pub fn difficulty(&self) -> &str {
        self.pow.difficulty()
    }

    /// Extend the chain with `payload`: build a candidate on the
    /// current head, run the successor check, solve a puzzle, append.
    /// Returns the new height (the appended block's index).
    pub fn append_payload(&mut self, payload: impl Into<String>) -> Result<u64, ChainError> {
        self.append_payload_with(payload, &CancelToken::new(), &NoopObserver)
    }

    /// [`append_payload`](Self::append_payload) with caller-supplied
    /// cancellation and progress reporting. On cancellation the
    /// candidate is discarded and the chain is unchanged.
    pub fn append_payload_with(
        &mut self,
        payload: impl Into<String>,
        cancel: &CancelToken,
        observer: &dyn SolveObserver,
    ) -> Result<u64, ChainError> {
        let candidate = Block::next_candidate(self.head(), payload, Utc::now().timestamp());

        // Always true for locally built candidates; kept as a defensive
        // invariant before any puzzle work is spent.
        validate_successor(self.head(), &candidate).map_err(ChainError::AppendRejected)?;

        match self.pow.solve(cancel, observer) {
            SolveOutcome::Solved { .. } => {
                let height = candidate.index;
                self.chain.push(candidate);
                info!("block added (height: {height})");
                Ok(height)
            }
            SolveOutcome::Cancelled => Err(ChainError::Cancelled),
        }
    }

    /// Adopt `candidate` wholesale iff it validates and is strictly
    /// longer than the current chain.
    pub fn replace_with(&mut self, candidate: Vec<Block>) -> Result<(), ChainError> {
        validate_chain(&candidate).map_err(ChainError::ChainRejected)?;

        if candidate.len() <= self.chain.len() {
            return Err(ChainError::ChainNotLonger {
                candidate: candidate.len(),
                current: self.chain.len(),
            });
        }

        info!(
            "replacing current chain ({} -> {} blocks), fork resolved",
            self.chain.len(),
            candidate.len()
        );
        self.chain = candidate;
        Ok(())
    }

    /// Human-readable dump of every block in order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in &self.chain {
            out.push_str(&block.to_string());
            out.push('\n');
        }
        out
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
