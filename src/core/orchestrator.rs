//! # Orchestrator: owns the run's resources and the whole task tree.
//!
//! The [`Orchestrator`] is the only component that creates or destroys
//! shared resources. It validates the configuration, builds the order
//! book, progress channel, rendezvous gates, and log sinks, spawns the
//! aggregator and the worker pool, and drives the run to one of two
//! ends:
//!
//! - **success**: the `done` gate opens → settling delay → print
//!   permission → every task reaped → final report returned;
//! - **interruption**: a termination signal (or external cancel) →
//!   every task force-cancelled → bounded-grace reap →
//!   [`RuntimeError::Interrupted`].
//!
//! Teardown runs exactly once on both paths and is idempotent — calling
//! it again is a no-op, never a double-free.
//!
//! ## Wiring
//! ```text
//! run():
//!   listener: Bus.subscribe() ─► SubscriberSet::emit   (fire-and-forget)
//!   spawn aggregator(rx, done, print)
//!   spawn worker 1..=N (sampled capacity/duration, child tokens)
//!
//!   select:
//!     done.passed()        → settle → print.open() → reap → report
//!     termination signal   → cancel tree → grace reap → Interrupted
//!     external cancel      → same as signal
//! ```

use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::aggregator::Aggregator;
use crate::core::shutdown;
use crate::core::worker::{Worker, WorkerSummary};
use crate::error::{RuntimeError, SetupError};
use crate::events::{Bus, Event, EventKind};
use crate::progress::{self, ProgressReceiver, ProgressSender};
use crate::rendezvous::Gate;
use crate::report::FinalReport;
use crate::state::OrderBook;
use crate::subscribers::{FileLog, LogScope, Subscribe, SubscriberSet};

/// Owns every shared resource of one simulation run.
///
/// Must be constructed inside a Tokio runtime (the subscriber set spawns
/// its sink workers immediately). One orchestrator drives one run.
pub struct Orchestrator {
    cfg: Config,
    bus: Bus,
    book: Arc<OrderBook>,
    done: Arc<Gate>,
    print: Arc<Gate>,
    token: CancellationToken,
    subs: Option<SubscriberSet>,
    listener: Option<(CancellationToken, JoinHandle<()>)>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Validates the configuration and creates all shared resources.
    ///
    /// Fails fast: an invalid configuration or an unopenable log sink
    /// returns a [`SetupError`] with nothing left behind. File sinks
    /// configured in `cfg` are appended to the given subscribers.
    pub fn new(
        cfg: Config,
        mut subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, SetupError> {
        cfg.validate()?;

        if let Some(path) = &cfg.worker_log {
            subscribers.push(Arc::new(FileLog::create(path, LogScope::Workers)?));
        }
        if let Some(path) = &cfg.report_log {
            subscribers.push(Arc::new(FileLog::create(path, LogScope::Aggregator)?));
        }

        let bus = Bus::new(cfg.bus_capacity_clamped());
        let book = Arc::new(OrderBook::new(cfg.order_size, cfg.worker_count));
        let subs = SubscriberSet::new(subscribers);

        Ok(Self {
            cfg,
            bus,
            book,
            done: Arc::new(Gate::new()),
            print: Arc::new(Gate::new()),
            token: CancellationToken::new(),
            subs: Some(subs),
            listener: None,
        })
    }

    /// Handle for cancelling the run from outside (the programmatic
    /// equivalent of a termination signal).
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    /// The run's shared order state, for diagnostics and tests.
    pub fn order_book(&self) -> Arc<OrderBook> {
        Arc::clone(&self.book)
    }

    /// Drives the run to completion or interruption, then tears down.
    pub async fn run(&mut self) -> Result<FinalReport, RuntimeError> {
        let result = self.drive().await;
        self.teardown().await;
        result
    }

    async fn drive(&mut self) -> Result<FinalReport, RuntimeError> {
        self.start_listener();
        self.bus.publish(
            Event::new(EventKind::OrderOpened)
                .with_order_size(self.cfg.order_size)
                .with_workers(self.cfg.worker_count),
        );

        let (progress_tx, progress_rx) = progress::channel(self.cfg.channel_capacity_clamped());
        let aggregator = self.spawn_aggregator(progress_rx);
        let mut workers = JoinSet::new();
        self.spawn_workers(&mut workers, &progress_tx);
        // Workers hold their own clones; dropping ours lets the channel
        // close when the last worker is gone.
        drop(progress_tx);

        let interrupted = tokio::select! {
            _ = self.done.passed() => false,
            _ = Self::termination_signal() => true,
            _ = self.token.cancelled() => true,
        };

        if interrupted {
            self.bus.publish(Event::new(EventKind::ShutdownRequested));
            self.token.cancel();
            return Err(self.reap_with_grace(workers, aggregator).await);
        }

        self.grant_print().await;
        self.reap_workers(&mut workers).await;

        match aggregator.await {
            Ok(Some(report)) => Ok(report),
            Ok(None) => Err(RuntimeError::AggregatorLost {
                reason: "exited before producing the report".to_string(),
            }),
            Err(err) => {
                self.bus
                    .publish(Event::new(EventKind::TaskPanicked).with_reason(err.to_string()));
                Err(RuntimeError::AggregatorLost { reason: err.to_string() })
            }
        }
    }

    /// Waits for a termination signal; never resolves if signal
    /// registration fails (the failure is reported once instead).
    async fn termination_signal() {
        if let Err(err) = shutdown::wait_for_shutdown_signal().await {
            eprintln!("[orderline] signal registration failed: {err}");
            std::future::pending::<()>().await;
        }
    }

    /// Forwards bus events to the subscriber set until told to stop,
    /// then drains both the bus buffer and the per-sink queues.
    fn start_listener(&mut self) {
        let Some(set) = self.subs.take() else {
            return;
        };
        let stop = CancellationToken::new();
        let stopped = stop.clone();
        let mut rx = self.bus.subscribe();

        let handle = tokio::spawn(async move {
            use tokio::sync::broadcast::error::{RecvError, TryRecvError};
            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = stopped.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(&ev),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            set.shutdown().await;
        });
        self.listener = Some((stop, handle));
    }

    fn spawn_aggregator(&self, rx: ProgressReceiver) -> JoinHandle<Option<FinalReport>> {
        let aggregator = Aggregator::new(self.cfg.worker_count);
        tokio::spawn(aggregator.run(
            rx,
            Arc::clone(&self.book),
            self.bus.clone(),
            Arc::clone(&self.done),
            Arc::clone(&self.print),
            self.token.child_token(),
        ))
    }

    fn spawn_workers(&self, set: &mut JoinSet<WorkerSummary>, progress: &ProgressSender) {
        for id in 1..=self.cfg.worker_count {
            let worker = Worker {
                id,
                capacity: self.cfg.sample_capacity(),
                duration: self.cfg.sample_duration(),
            };
            self.bus.publish(
                Event::new(EventKind::WorkerSpawned)
                    .with_worker(id)
                    .with_capacity(worker.capacity)
                    .with_duration(worker.duration),
            );
            set.spawn(worker.run(
                Arc::clone(&self.book),
                progress.clone(),
                self.bus.clone(),
                self.token.child_token(),
            ));
        }
    }

    /// Settling delay, then print permission. The delay is a quiescence
    /// heuristic for log ordering, never a correctness barrier.
    async fn grant_print(&self) {
        if !self.cfg.settle.is_zero() {
            time::sleep(self.cfg.settle).await;
        }
        self.bus.publish(Event::new(EventKind::PrintGranted));
        self.print.open();
    }

    /// Reaps every worker, reporting abnormal exits as diagnostics.
    async fn reap_workers(&self, set: &mut JoinSet<WorkerSummary>) {
        while let Some(reaped) = set.join_next().await {
            if let Err(err) = reaped {
                self.bus
                    .publish(Event::new(EventKind::TaskPanicked).with_reason(err.to_string()));
            }
        }
    }

    /// Interrupted path: wait for the cancelled tree within the grace
    /// window; abandoned tasks are reported, not waited on forever.
    async fn reap_with_grace(
        &self,
        mut workers: JoinSet<WorkerSummary>,
        aggregator: JoinHandle<Option<FinalReport>>,
    ) -> RuntimeError {
        let grace = self.cfg.grace;
        let drain = async {
            while workers.join_next().await.is_some() {}
            let _ = aggregator.await;
        };

        match time::timeout(grace, drain).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                RuntimeError::Interrupted
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                RuntimeError::GraceExceeded { grace }
            }
        }
    }

    /// Releases the run's resources. Idempotent: the first call stops
    /// the event listener and drains every sink; later calls are no-ops.
    pub async fn teardown(&mut self) {
        if let Some((stop, handle)) = self.listener.take() {
            stop.cancel();
            let _ = handle.await;
        }
        if let Some(set) = self.subs.take() {
            // run() was never called; the listener never took the set.
            set.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_cfg(workers: u32, order: u32, capacity: u32) -> Config {
        let mut cfg = Config::default();
        cfg.worker_count = workers;
        cfg.order_size = order;
        cfg.capacity_min = capacity;
        cfg.capacity_max = capacity;
        cfg.duration_min = Duration::from_millis(1);
        cfg.duration_max = Duration::from_millis(1);
        cfg.settle = Duration::ZERO;
        cfg.grace = Duration::from_secs(1);
        cfg
    }

    #[tokio::test]
    async fn test_setup_error_creates_nothing() {
        let mut cfg = fast_cfg(1, 100, 100);
        cfg.order_size = 0;
        assert!(matches!(
            Orchestrator::new(cfg, Vec::new()),
            Err(SetupError::OrderSize { .. })
        ));
    }

    #[tokio::test]
    async fn test_full_run_produces_exact_report() {
        let mut orch = Orchestrator::new(fast_cfg(1, 100, 100), Vec::new()).unwrap();
        let report = orch.run().await.expect("run should succeed");
        assert_eq!(report.grand_total(), 100);
        assert!(report.fulfilled());
        assert_eq!(orch.order_book().snapshot().remaining, 0);
        assert_eq!(orch.order_book().active_workers(), 0);
    }

    #[tokio::test]
    async fn test_teardown_twice_is_safe() {
        let mut orch = Orchestrator::new(fast_cfg(1, 10, 10), Vec::new()).unwrap();
        let _ = orch.run().await;
        orch.teardown().await;
        orch.teardown().await;
    }

    #[tokio::test]
    async fn test_external_cancel_interrupts_the_run() {
        let mut cfg = fast_cfg(2, 1_000_000, 10);
        cfg.duration_min = Duration::from_secs(5);
        cfg.duration_max = Duration::from_secs(5);
        let mut orch = Orchestrator::new(cfg, Vec::new()).unwrap();

        let cancel = orch.cancel_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let err = orch.run().await.expect_err("run should be interrupted");
        assert!(matches!(err, RuntimeError::Interrupted));
        assert_eq!(err.exit_code(), 128);
    }
}
