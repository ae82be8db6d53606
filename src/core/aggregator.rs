//! # Aggregator: drains progress reports and owns the final report.
//!
//! The aggregator is the progress channel's single consumer. It keeps an
//! exact live count of workers — push-based, decremented once per
//! completion notice — so it never has to poll worker state. When the
//! count hits zero it opens the `done` gate, waits for print permission,
//! and only then produces the authoritative [`FinalReport`].
//!
//! ## Two-phase print handshake
//! ```text
//! active == 0 ──► done.open() ──► orchestrator settles ──► print.open()
//!                                                              │
//!                                     report rendered ◄────────┘
//! ```
//! The report can therefore never interleave with in-flight log writes
//! from the workers or from this loop's own lines.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::progress::{ProgressReceiver, Report};
use crate::rendezvous::Gate;
use crate::report::{FinalReport, WorkerTotals};
use crate::state::OrderBook;

/// The progress channel's single consumer.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    worker_count: u32,
}

impl Aggregator {
    /// Creates an aggregator expecting one completion per worker.
    pub fn new(worker_count: u32) -> Self {
        Self { worker_count }
    }

    /// Consumes reports until every worker has completed, performs the
    /// print handshake, and returns the final report.
    ///
    /// Returns `None` when the run is torn down before completion: the
    /// token fired, or the channel closed while workers were still
    /// active (both only reachable on the interrupted path).
    pub async fn run(
        self,
        mut rx: ProgressReceiver,
        book: Arc<OrderBook>,
        bus: Bus,
        done: Arc<Gate>,
        print: Arc<Gate>,
        token: CancellationToken,
    ) -> Option<FinalReport> {
        bus.publish(Event::new(EventKind::AggregatorStarted));

        let slots = self.worker_count as usize + 1; // 1-based worker ids
        let mut units = vec![0u32; slots];
        let mut iterations = vec![0u32; slots];
        let mut active = self.worker_count;

        while active > 0 {
            let received = tokio::select! {
                r = rx.recv() => r,
                _ = token.cancelled() => return None,
            };

            match received {
                Some(Report::Production { worker_id, units: made, duration, .. }) => {
                    if worker_id == 0 || worker_id > self.worker_count {
                        bus.publish(
                            Event::new(EventKind::ProgressLost)
                                .with_worker(worker_id)
                                .with_reason("production report for unknown worker"),
                        );
                        continue;
                    }
                    bus.publish(
                        Event::new(EventKind::ProductionReceived)
                            .with_worker(worker_id)
                            .with_units(made)
                            .with_duration(duration),
                    );
                    units[worker_id as usize] += made;
                    iterations[worker_id as usize] += 1;
                }
                Some(Report::Completion { worker_id }) => {
                    if worker_id == 0 || worker_id > self.worker_count {
                        bus.publish(
                            Event::new(EventKind::ProgressLost)
                                .with_worker(worker_id)
                                .with_reason("completion notice for unknown worker"),
                        );
                        continue;
                    }
                    bus.publish(Event::new(EventKind::CompletionReceived).with_worker(worker_id));
                    active = active.saturating_sub(1);
                    book.worker_done();
                }
                None => {
                    bus.publish(
                        Event::new(EventKind::ProgressLost)
                            .with_reason("progress channel closed before all workers completed"),
                    );
                    return None;
                }
            }
        }

        bus.publish(Event::new(EventKind::AllComplete));
        done.open();

        tokio::select! {
            _ = print.passed() => {}
            _ = token.cancelled() => return None,
        }

        let rows = (1..=self.worker_count)
            .map(|id| WorkerTotals {
                worker_id: id,
                units: units[id as usize],
                iterations: iterations[id as usize],
            })
            .collect();
        let report = FinalReport {
            order_size: book.order_size(),
            rows,
        };
        bus.publish(Event::new(EventKind::ReportReady).with_report(Arc::new(report.clone())));
        Some(report)
    }
}
