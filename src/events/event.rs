//! # Runtime events emitted by the orchestrator, workers, and aggregator.
//!
//! [`EventKind`] classifies the lifecycle of a run; [`Event`] carries the
//! metadata each kind sets. Subscribers render these into the run's
//! operational log lines, so every externally visible event of the
//! protocol (order opened, worker spawned/started, chunk claimed, report
//! received, completion, print permission, final report, shutdown) has a
//! kind here.
//!
//! ## Ordering
//! Each event carries a globally unique, monotonically increasing
//! sequence number (`seq`). Delivery order across subscribers is not
//! guaranteed; use `seq` to reconstruct emission order.
//!
//! ## Example
//! ```
//! use orderline::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ChunkClaimed)
//!     .with_worker(3)
//!     .with_units(25)
//!     .with_duration(std::time::Duration::from_millis(750));
//!
//! assert_eq!(ev.kind, EventKind::ChunkClaimed);
//! assert_eq!(ev.worker, Some(3));
//! assert_eq!(ev.units, Some(25));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::report::FinalReport;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Orchestrator events ===
    /// A new order was opened and resources created.
    ///
    /// Sets: `order_size`, `workers`.
    OrderOpened,

    /// A worker was spawned with its sampled parameters.
    ///
    /// Sets: `worker`, `capacity`, `duration_ms`.
    WorkerSpawned,

    /// Print permission granted to the aggregator after the settling delay.
    PrintGranted,

    /// Shutdown requested (termination signal or external cancel).
    ShutdownRequested,

    /// All tasks stopped within the grace window after interruption.
    AllStoppedWithin,

    /// Grace window exceeded; some tasks were abandoned.
    GraceExceeded,

    /// A task ended abnormally while being reaped.
    ///
    /// Sets: `reason`; `worker` when the task was a worker.
    TaskPanicked,

    // === Worker events ===
    /// A worker announced itself before its first claim.
    ///
    /// Sets: `worker`, `capacity`, `duration_ms`.
    WorkerStarted,

    /// A worker claimed a chunk and is about to produce it.
    ///
    /// Sets: `worker`, `units`, `duration_ms`.
    ChunkClaimed,

    /// A fire-and-forget progress send dropped its report.
    ///
    /// Sets: `worker`, `reason`.
    ReportDropped,

    /// A worker left the claim loop and summarized itself.
    ///
    /// Sets: `worker`, `total_units`, `iterations`.
    WorkerFinished,

    // === Aggregator events ===
    /// The aggregator announced itself before its receive loop.
    AggregatorStarted,

    /// A production report was received and accumulated.
    ///
    /// Sets: `worker`, `units`, `duration_ms`.
    ProductionReceived,

    /// A completion notice was received.
    ///
    /// Sets: `worker`.
    CompletionReceived,

    /// A progress report could not be received or used: a report named
    /// an unknown worker (skipped, loop continues) or the channel closed
    /// before all workers completed (loop bails; interrupted path only).
    ///
    /// Sets: `reason`; `worker` when a specific report was skipped.
    ProgressLost,

    /// Every worker has reported completion.
    AllComplete,

    /// The final report was produced.
    ///
    /// Sets: `report`.
    ReportReady,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - remaining fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker id, when the event concerns a single worker.
    pub worker: Option<u32>,
    /// Worker pool size (OrderOpened).
    pub workers: Option<u32>,
    /// Sampled chunk capacity.
    pub capacity: Option<u32>,
    /// Units in the chunk this event is about.
    pub units: Option<u32>,
    /// Production latency in milliseconds (compact).
    pub duration_ms: Option<u32>,
    /// Cumulative units (WorkerFinished).
    pub total_units: Option<u32>,
    /// Iteration count (WorkerFinished).
    pub iterations: Option<u32>,
    /// Requested order size (OrderOpened).
    pub order_size: Option<u32>,
    /// Human-readable reason (drops, panics, channel loss).
    pub reason: Option<Arc<str>>,
    /// The final report (ReportReady).
    pub report: Option<Arc<FinalReport>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and the next global sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            workers: None,
            capacity: None,
            units: None,
            duration_ms: None,
            total_units: None,
            iterations: None,
            order_size: None,
            reason: None,
            report: None,
        }
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, id: u32) -> Self {
        self.worker = Some(id);
        self
    }

    /// Attaches the worker pool size.
    #[inline]
    pub fn with_workers(mut self, n: u32) -> Self {
        self.workers = Some(n);
        self
    }

    /// Attaches a chunk capacity.
    #[inline]
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Attaches a chunk size.
    #[inline]
    pub fn with_units(mut self, units: u32) -> Self {
        self.units = Some(units);
        self
    }

    /// Attaches a production latency (stored as milliseconds).
    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.duration_ms = Some(ms);
        self
    }

    /// Attaches a cumulative unit total.
    #[inline]
    pub fn with_total_units(mut self, total: u32) -> Self {
        self.total_units = Some(total);
        self
    }

    /// Attaches an iteration count.
    #[inline]
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = Some(n);
        self
    }

    /// Attaches the requested order size.
    #[inline]
    pub fn with_order_size(mut self, size: u32) -> Self {
        self.order_size = Some(size);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the final report.
    #[inline]
    pub fn with_report(mut self, report: Arc<FinalReport>) -> Self {
        self.report = Some(report);
        self
    }
}
