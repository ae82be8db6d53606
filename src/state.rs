//! # Shared order state and the chunk-claim protocol.
//!
//! [`OrderBook`] is the single shared mutable record of a run: how many
//! units the order requested, how many have been produced, how many are
//! still unclaimed, and how many workers have not yet reported
//! completion.
//!
//! ## Claim protocol
//! Every worker repeats a check-then-act sequence: observe `remaining`,
//! compute `chunk = min(capacity, remaining)`, subtract. The whole
//! sequence MUST be atomic — two workers observing the same positive
//! `remaining` could otherwise jointly over-subtract the pool. A single
//! mutex around [`OrderBook::claim`] covers it; the critical section is
//! pure arithmetic with no I/O and no await.
//!
//! ## Invariants
//! - `produced + remaining == order_size` at every observable point
//! - `remaining` never underflows (claims cap at what is left)
//! - `active_workers` is decremented exactly once per worker, only by
//!   the aggregator, and never goes below zero
//!
//! `active_workers` is a plain atomic rather than part of the mutexed
//! pool: it has a single writer (the aggregator) and is a diagnostic
//! mirror, not an input to the claim protocol.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

/// The two mutexed counters of the unit pool.
#[derive(Debug, Clone, Copy)]
struct Pool {
    produced: u32,
    remaining: u32,
}

/// Point-in-time view of the pool, for diagnostics and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Cumulative units produced so far.
    pub produced: u32,
    /// Units not yet claimed.
    pub remaining: u32,
}

/// Shared, mutable order state. One instance per run, behind `Arc`.
///
/// Created and initialized by the orchestrator before any worker exists;
/// mutated by workers through [`OrderBook::claim`] and by the aggregator
/// through [`OrderBook::worker_done`].
#[derive(Debug)]
pub struct OrderBook {
    order_size: u32,
    pool: Mutex<Pool>,
    active_workers: AtomicU32,
}

impl OrderBook {
    /// Creates the order book with the full order unclaimed and every
    /// worker counted as active.
    pub fn new(order_size: u32, worker_count: u32) -> Self {
        Self {
            order_size,
            pool: Mutex::new(Pool {
                produced: 0,
                remaining: order_size,
            }),
            active_workers: AtomicU32::new(worker_count),
        }
    }

    /// Total units requested. Set once at creation, read-only after.
    #[inline]
    pub fn order_size(&self) -> u32 {
        self.order_size
    }

    /// Atomically claims up to `capacity` units from the pool.
    ///
    /// Returns the claimed chunk size, or `0` when the pool is exhausted
    /// (the worker's signal to stop). A `capacity` of `0` claims nothing
    /// and is not an error.
    pub fn claim(&self, capacity: u32) -> u32 {
        let mut pool = self.pool.lock().unwrap_or_else(PoisonError::into_inner);
        if pool.remaining == 0 {
            return 0;
        }
        let chunk = capacity.min(pool.remaining);
        pool.remaining -= chunk;
        pool.produced += chunk;
        chunk
    }

    /// Records one worker's completion notice. Aggregator-only.
    ///
    /// Returns the number of workers still active. Saturates at zero so
    /// a duplicate notice can never wrap the counter.
    pub fn worker_done(&self) -> u32 {
        self.active_workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|prev| prev - 1)
            .unwrap_or(0)
    }

    /// Number of workers that have not yet reported completion.
    #[inline]
    pub fn active_workers(&self) -> u32 {
        self.active_workers.load(Ordering::Acquire)
    }

    /// Consistent snapshot of the produced/remaining counters.
    pub fn snapshot(&self) -> PoolSnapshot {
        let pool = self.pool.lock().unwrap_or_else(PoisonError::into_inner);
        PoolSnapshot {
            produced: pool.produced,
            remaining: pool.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_claim_caps_at_capacity() {
        let book = OrderBook::new(100, 1);
        assert_eq!(book.claim(30), 30);
        let snap = book.snapshot();
        assert_eq!(snap.produced, 30);
        assert_eq!(snap.remaining, 70);
    }

    #[test]
    fn test_claim_caps_at_remaining() {
        let book = OrderBook::new(20, 1);
        assert_eq!(book.claim(30), 20);
        assert_eq!(book.claim(30), 0);
        let snap = book.snapshot();
        assert_eq!(snap.produced, 20);
        assert_eq!(snap.remaining, 0);
    }

    #[test]
    fn test_zero_capacity_claims_nothing() {
        let book = OrderBook::new(10, 1);
        assert_eq!(book.claim(0), 0);
        assert_eq!(book.snapshot().remaining, 10);
    }

    #[test]
    fn test_drain_to_exactly_zero() {
        let book = OrderBook::new(100, 1);
        let mut total = 0;
        loop {
            let chunk = book.claim(7);
            if chunk == 0 {
                break;
            }
            total += chunk;
        }
        assert_eq!(total, 100);
        assert_eq!(book.snapshot().remaining, 0);
        assert_eq!(book.snapshot().produced, 100);
    }

    #[test]
    fn test_worker_countdown_saturates() {
        let book = OrderBook::new(10, 2);
        assert_eq!(book.worker_done(), 1);
        assert_eq!(book.worker_done(), 0);
        assert_eq!(book.worker_done(), 0);
        assert_eq!(book.active_workers(), 0);
    }

    // Hammer the claim path from many threads: the pool must end at
    // exactly zero with the produced/remaining invariant intact at every
    // observed point.
    #[test]
    fn test_concurrent_claims_never_oversubtract() {
        const ORDER: u32 = 10_000;
        let book = Arc::new(OrderBook::new(ORDER, 8));

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let book = Arc::clone(&book);
            handles.push(std::thread::spawn(move || {
                let capacity = 3 + i * 5;
                let mut mine = 0u32;
                loop {
                    let chunk = book.claim(capacity);
                    if chunk == 0 {
                        break;
                    }
                    assert!(chunk <= capacity);
                    let snap = book.snapshot();
                    assert_eq!(snap.produced + snap.remaining, ORDER);
                    mine += chunk;
                }
                mine
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, ORDER);
        let snap = book.snapshot();
        assert_eq!(snap.remaining, 0);
        assert_eq!(snap.produced, ORDER);
    }
}
