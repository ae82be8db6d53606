//! # Stdout logging subscriber.
//!
//! [`LogWriter`] prints every runtime event to stdout in a compact
//! human-readable format. The line renderers are shared with the file
//! sink so a given event reads the same everywhere it lands.
//!
//! ## Output format
//! ```text
//! [order-opened] size=100 workers=2
//! [worker-spawned] worker=1 capacity=30 duration=700ms
//! [worker-started] worker=1 capacity=30 duration=700ms
//! [claimed] worker=1 units=30 duration=700ms
//! [produced] worker=1 units=30 duration=700ms
//! [completed] worker=1
//! [worker-finished] worker=1 total=60 iterations=2
//! [all-complete] awaiting print permission
//! [print-granted]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Renders orchestrator-side events (stdout and nowhere else by default).
pub(crate) fn orchestrator_line(ev: &Event) -> Option<String> {
    match ev.kind {
        EventKind::OrderOpened => Some(format!(
            "[order-opened] size={:?} workers={:?}",
            ev.order_size, ev.workers
        )),
        EventKind::WorkerSpawned => Some(format!(
            "[worker-spawned] worker={:?} capacity={:?} duration={:?}ms",
            ev.worker, ev.capacity, ev.duration_ms
        )),
        EventKind::PrintGranted => Some("[print-granted]".to_string()),
        EventKind::ShutdownRequested => Some("[shutdown-requested]".to_string()),
        EventKind::AllStoppedWithin => Some("[all-stopped-within-grace]".to_string()),
        EventKind::GraceExceeded => Some("[grace-exceeded]".to_string()),
        EventKind::TaskPanicked => Some(format!(
            "[task-panicked] worker={:?} reason={:?}",
            ev.worker, ev.reason
        )),
        _ => None,
    }
}

/// Renders worker-side events (the shared worker log).
pub(crate) fn worker_line(ev: &Event) -> Option<String> {
    match ev.kind {
        EventKind::WorkerStarted => {
            if let (Some(worker), Some(capacity), Some(ms)) = (ev.worker, ev.capacity, ev.duration_ms) {
                Some(format!(
                    "Worker # {worker:2}: started, capacity = {capacity:3} units per {ms:4} ms chunk"
                ))
            } else {
                Some(format!("[worker-started] worker={:?}", ev.worker))
            }
        }
        EventKind::ChunkClaimed => {
            if let (Some(worker), Some(units), Some(ms)) = (ev.worker, ev.units, ev.duration_ms) {
                Some(format!(
                    "Worker # {worker:2}: going to make {units:3} units in {ms:4} ms"
                ))
            } else {
                Some(format!("[claimed] worker={:?} units={:?}", ev.worker, ev.units))
            }
        }
        EventKind::ReportDropped => Some(format!(
            "[report-dropped] worker={:?} reason={:?}",
            ev.worker, ev.reason
        )),
        EventKind::WorkerFinished => {
            if let (Some(worker), Some(total), Some(iters)) = (ev.worker, ev.total_units, ev.iterations) {
                Some(format!(
                    ">>> Worker # {worker:2}: terminating after {total:4} units in {iters:3} iterations"
                ))
            } else {
                Some(format!("[worker-finished] worker={:?}", ev.worker))
            }
        }
        _ => None,
    }
}

/// Renders aggregator-side events (the dedicated report log).
pub(crate) fn aggregator_line(ev: &Event) -> Option<String> {
    match ev.kind {
        EventKind::AggregatorStarted => Some("Aggregator: started".to_string()),
        EventKind::ProductionReceived => {
            if let (Some(worker), Some(units), Some(ms)) = (ev.worker, ev.units, ev.duration_ms) {
                Some(format!(
                    "Aggregator: worker # {worker:2} produced {units:3} units in {ms:4} ms"
                ))
            } else {
                Some(format!("[produced] worker={:?} units={:?}", ev.worker, ev.units))
            }
        }
        EventKind::CompletionReceived => {
            if let Some(worker) = ev.worker {
                Some(format!("Aggregator: worker # {worker:2} completed its task"))
            } else {
                Some(format!("[completed] worker={:?}", ev.worker))
            }
        }
        EventKind::ProgressLost => Some(format!("[progress-lost] reason={:?}", ev.reason)),
        EventKind::AllComplete => {
            Some("Aggregator: all workers complete, awaiting print permission".to_string())
        }
        EventKind::ReportReady => ev.report.as_ref().map(|report| format!("\n{report}")),
        _ => None,
    }
}

/// Simple stdout logging subscriber.
///
/// Prints every event category; use [`FileLog`](super::FileLog) to route
/// worker or aggregator lines into files instead.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        let line = orchestrator_line(event)
            .or_else(|| worker_line(event))
            .or_else(|| aggregator_line(event));
        if let Some(line) = line {
            println!("{line}");
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FinalReport, WorkerTotals};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_each_event_renders_in_exactly_one_scope() {
        let worker_ev = Event::new(EventKind::ChunkClaimed)
            .with_worker(1)
            .with_units(30)
            .with_duration(Duration::from_millis(700));
        assert!(worker_line(&worker_ev).is_some());
        assert!(orchestrator_line(&worker_ev).is_none());
        assert!(aggregator_line(&worker_ev).is_none());

        let agg_ev = Event::new(EventKind::CompletionReceived).with_worker(1);
        assert!(aggregator_line(&agg_ev).is_some());
        assert!(worker_line(&agg_ev).is_none());

        let orch_ev = Event::new(EventKind::PrintGranted);
        assert!(orchestrator_line(&orch_ev).is_some());
        assert!(aggregator_line(&orch_ev).is_none());
    }

    #[test]
    fn test_claim_line_contains_units_and_duration() {
        let ev = Event::new(EventKind::ChunkClaimed)
            .with_worker(3)
            .with_units(25)
            .with_duration(Duration::from_millis(900));
        let line = worker_line(&ev).unwrap();
        assert!(line.contains("going to make"));
        assert!(line.contains("25"));
        assert!(line.contains("900"));
    }

    #[test]
    fn test_report_ready_renders_full_report() {
        let report = FinalReport {
            order_size: 100,
            rows: vec![WorkerTotals { worker_id: 1, units: 100, iterations: 1 }],
        };
        let ev = Event::new(EventKind::ReportReady).with_report(Arc::new(report));
        let text = aggregator_line(&ev).unwrap();
        assert!(text.contains("Final Report"));
        assert!(text.contains("Grand total"));
    }
}
