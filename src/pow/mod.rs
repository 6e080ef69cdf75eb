//! Proof-of-work puzzle engine.
//!
//! Appending a block requires solving a nonce search first: find a
//! nonce whose SHA-256 digest of `{target}{nonce}` starts with the
//! current difficulty prefix. The preimage covers only the engine's
//! target and the nonce; the candidate block's fields are not part of
//! it and the winning nonce is not retained in the chain.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Fewest extra zeros (past the leading marker) a reroll can pick.
pub const MIN_EXTRA_ZEROS: usize = 1;
/// Most extra zeros a reroll can pick.
pub const MAX_EXTRA_ZEROS: usize = 5;
/// Nonce attempts between observer progress ticks.
pub const DEFAULT_PROGRESS_EVERY: u64 = 100_000;

/// Result of a nonce search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A satisfying nonce was found.
    Solved { nonce: u64 },
    /// The search was cancelled before a nonce was found.
    Cancelled,
}

/// Cooperative cancellation flag shared with a running search. The
/// search checks it between nonce attempts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Liveness callbacks emitted while a search runs, for an outer
/// interface to display. Purely informational.
pub trait SolveObserver {
    fn started(&self, _difficulty: &str) {}
    fn progress(&self, _attempts: u64) {}
    fn finished(&self, _outcome: &SolveOutcome) {}
}

/// Observer that ignores every signal.
pub struct NoopObserver;

impl SolveObserver for NoopObserver {}

/// Nonce-search engine with its own target and difficulty, so that
/// independent chains do not share puzzle state.
///
/// The target is fixed for the engine's lifetime; the difficulty is
/// re-rolled after every successful solve and only then.
#[derive(Debug)]
pub struct ProofOfWork {
    target: u64,
    difficulty: String,
    progress_every: u64,
}

impl ProofOfWork {
    /// Engine with a random target and a freshly rolled difficulty.
    pub fn new() -> Self {
        let mut pow = Self {
            target: rand::thread_rng().r#gen(),
            difficulty: String::new(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        };
        pow.reroll();
        pow
    }

    /// Engine with a pinned target and extra-zero count. Useful for
    /// reproducible runs; `solve` still rerolls afterwards.
    pub fn with_params(target: u64, extra_zeros: usize) -> Self {
        Self {
            target,
            difficulty: "0".repeat(1 + extra_zeros),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    /// Current required digest prefix (leading marker included).
    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn set_progress_every(&mut self, attempts: u64) {
        self.progress_every = attempts.max(1);
    }

    /// Pick the next difficulty: the leading marker zero plus
    /// `1..=5` further zeros, uniformly at random.
    fn reroll(&mut self) {
        let extra = rand::thread_rng().gen_range(MIN_EXTRA_ZEROS..=MAX_EXTRA_ZEROS);
        self.difficulty = "0".repeat(1 + extra);
        debug!("difficulty rerolled to {} leading zeros", self.difficulty.len());
    }

    /// Search nonces from zero until the digest of `{target}{nonce}`
    /// starts with the current difficulty prefix. Unbounded except for
    /// `cancel`. On success the difficulty is rerolled for the next
    /// search; on cancellation it is left as-is.
    pub fn solve(&mut self, cancel: &CancelToken, observer: &dyn SolveObserver) -> SolveOutcome {
        observer.started(&self.difficulty);
        let mut nonce: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                info!("proof of work cancelled after {nonce} attempts");
                let outcome = SolveOutcome::Cancelled;
                observer.finished(&outcome);
                return outcome;
            }

            let mut hasher = Sha256::new();
            hasher.update(format!("{}{}", self.target, nonce).as_bytes());
            let digest = hex::encode(hasher.finalize());

            if digest.starts_with(&self.difficulty) {
                info!("proof of work solved (nonce: {nonce})");
                self.reroll();
                let outcome = SolveOutcome::Solved { nonce };
                observer.finished(&outcome);
                return outcome;
            }

            nonce += 1;
            if nonce % self.progress_every == 0 {
                observer.progress(nonce);
            }
        }
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{
        CancelToken, NoopObserver, ProofOfWork, SolveObserver, SolveOutcome, MAX_EXTRA_ZEROS,
        MIN_EXTRA_ZEROS,
    };

    struct RecordingObserver {
        started: Cell<u32>,
        finished: Cell<u32>,
    }

    impl SolveObserver for RecordingObserver {
        fn started(&self, _difficulty: &str) {
            self.started.set(self.started.get() + 1);
        }

        fn finished(&self, _outcome: &SolveOutcome) {
            self.finished.set(self.finished.get() + 1);
        }
    }

    #[test]
    fn solve_finds_a_nonce_at_low_difficulty() {
        let mut pow = ProofOfWork::with_params(7, MIN_EXTRA_ZEROS);
        match pow.solve(&CancelToken::new(), &NoopObserver) {
            SolveOutcome::Solved { .. } => {}
            SolveOutcome::Cancelled => panic!("search was never cancelled"),
        }
    }

    #[test]
    fn difficulty_rerolls_into_bounds_after_solve() {
        let mut pow = ProofOfWork::with_params(7, MIN_EXTRA_ZEROS);
        for _ in 0..10 {
            // Keep the prefix short so each solve stays fast, then let
            // the reroll pick freely and check its bounds.
            let outcome = pow.solve(&CancelToken::new(), &NoopObserver);
            assert!(matches!(outcome, SolveOutcome::Solved { .. }));

            let extra = pow.difficulty().len() - 1;
            assert!((MIN_EXTRA_ZEROS..=MAX_EXTRA_ZEROS).contains(&extra));
            assert!(pow.difficulty().chars().all(|c| c == '0'));

            pow = ProofOfWork::with_params(7, MIN_EXTRA_ZEROS);
        }
    }

    #[test]
    fn cancelled_search_reports_cancelled_and_keeps_difficulty() {
        let mut pow = ProofOfWork::with_params(7, MAX_EXTRA_ZEROS);
        let before = pow.difficulty().to_string();

        let cancel = CancelToken::new();
        cancel.cancel();

        assert_eq!(pow.solve(&cancel, &NoopObserver), SolveOutcome::Cancelled);
        assert_eq!(pow.difficulty(), before);
    }

    #[test]
    fn observer_sees_start_and_finish() {
        let obs = RecordingObserver {
            started: Cell::new(0),
            finished: Cell::new(0),
        };
        let mut pow = ProofOfWork::with_params(7, MIN_EXTRA_ZEROS);
        pow.solve(&CancelToken::new(), &obs);
        assert_eq!(obs.started.get(), 1);
        assert_eq!(obs.finished.get(), 1);
    }
}
