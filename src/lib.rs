//! An in-memory, append-only chain of hash-linked blocks.
//!
//! Each block commits to the content and identity of its predecessor,
//! every append is gated by a proof-of-work puzzle, and when two
//! competing chains exist the longer valid one wins.
//!
//! The crate is the core consumed by an outer interface (see the
//! bundled REPL binary): [`Blockchain`] owns the chain and the puzzle
//! engine, `blockchain::validate` holds the structural checks, and
//! [`pow`] the nonce search with its adaptive difficulty.

pub mod blockchain;
pub mod pow;

pub use blockchain::{Block, Blockchain, ChainError, ValidationError};
pub use pow::{CancelToken, ProofOfWork, SolveObserver, SolveOutcome};
