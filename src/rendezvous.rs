//! # One-shot rendezvous gates.
//!
//! [`Gate`] is a single-use binary signal: one party opens it exactly
//! once, the other party waits until it is open. Two instances implement
//! the two-phase print handshake:
//!
//! ```text
//! aggregator ── open(done) ──► orchestrator (settling delay)
//! orchestrator ── open(print) ──► aggregator (renders final report)
//! ```
//!
//! Built on a zero-permit [`tokio::sync::Semaphore`]: opening posts the
//! single permit, waiting acquires it. Opening twice is idempotent — the
//! permit is posted at most once, so a duplicate open can never let two
//! waiters through a one-shot gate.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;

/// One-shot binary rendezvous signal. Intended for a single waiter.
#[derive(Debug)]
pub struct Gate {
    sem: Semaphore,
    opened: AtomicBool,
}

impl Gate {
    /// Creates a closed gate.
    pub fn new() -> Self {
        Self {
            sem: Semaphore::new(0),
            opened: AtomicBool::new(false),
        }
    }

    /// Opens the gate, releasing the waiter. Idempotent.
    pub fn open(&self) {
        if !self.opened.swap(true, Ordering::AcqRel) {
            self.sem.add_permits(1);
        }
    }

    /// True once [`Gate::open`] has been called.
    pub fn is_open(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }

    /// Waits until the gate is opened.
    pub async fn passed(&self) {
        if let Ok(permit) = self.sem.acquire().await {
            permit.forget();
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}
