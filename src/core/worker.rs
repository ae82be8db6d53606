//! # Worker: claims bounded chunks until the pool runs dry.
//!
//! One [`Worker`] task per pool member. Each iteration claims up to
//! `capacity` units under the order book's lock, simulates the
//! production latency, and reports the chunk on the progress channel.
//! Leaving the loop triggers exactly one completion notice — the
//! aggregator's termination detection depends on it, so the notice is
//! attempted even when every prior send failed.
//!
//! ## Loop shape
//! ```text
//! loop {
//!   chunk = book.claim(capacity)        // the only critical section
//!   if chunk == 0 → break               // pool exhausted
//!   publish ChunkClaimed
//!   sleep(duration)                     // cancellable, no lock held
//!   send Production (fire-and-forget)
//! }
//! send Completion (fire-and-forget, mandatory attempt)
//! publish WorkerFinished
//! ```
//!
//! Cancellation is whole-tree only: a cancelled worker stops claiming,
//! still reports the chunk it already subtracted from the pool, and
//! still attempts its completion notice on the way out.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::progress::{ProgressSender, Report};
use crate::state::OrderBook;

/// One member of the worker pool.
#[derive(Debug, Clone, Copy)]
pub struct Worker {
    /// Worker id (1-based).
    pub id: u32,
    /// Maximum chunk size this worker claims per iteration.
    pub capacity: u32,
    /// Simulated production latency per chunk.
    pub duration: Duration,
}

/// What a worker did over its whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Worker id (1-based).
    pub id: u32,
    /// Units produced across all iterations.
    pub total_units: u32,
    /// Number of chunks produced.
    pub iterations: u32,
}

impl Worker {
    /// Runs the claim loop to pool exhaustion (or cancellation), then
    /// sends the completion notice and returns the run summary.
    pub async fn run(
        self,
        book: Arc<OrderBook>,
        progress: ProgressSender,
        bus: Bus,
        token: CancellationToken,
    ) -> WorkerSummary {
        bus.publish(
            Event::new(EventKind::WorkerStarted)
                .with_worker(self.id)
                .with_capacity(self.capacity)
                .with_duration(self.duration),
        );

        let mut iterations = 0u32;
        let mut total_units = 0u32;

        while !token.is_cancelled() {
            let chunk = book.claim(self.capacity);
            if chunk == 0 {
                break;
            }
            iterations += 1;
            total_units += chunk;

            bus.publish(
                Event::new(EventKind::ChunkClaimed)
                    .with_worker(self.id)
                    .with_units(chunk)
                    .with_duration(self.duration),
            );

            tokio::select! {
                _ = time::sleep(self.duration) => {}
                _ = token.cancelled() => {}
            }

            // The chunk is already subtracted from the pool, so report it
            // even when the sleep was cut short by cancellation.
            let report = Report::Production {
                worker_id: self.id,
                capacity: self.capacity,
                units: chunk,
                duration: self.duration,
            };
            if let Err(dropped) = progress.send(report) {
                bus.publish(
                    Event::new(EventKind::ReportDropped)
                        .with_worker(self.id)
                        .with_reason(dropped.as_label()),
                );
            }
        }

        if let Err(dropped) = progress.send(Report::Completion { worker_id: self.id }) {
            bus.publish(
                Event::new(EventKind::ReportDropped)
                    .with_worker(self.id)
                    .with_reason(dropped.as_label()),
            );
        }

        bus.publish(
            Event::new(EventKind::WorkerFinished)
                .with_worker(self.id)
                .with_total_units(total_units)
                .with_iterations(iterations),
        );

        WorkerSummary {
            id: self.id,
            total_units,
            iterations,
        }
    }
}
