//! # File logging subscriber.
//!
//! [`FileLog`] routes one scope of events into a file sink:
//!
//! - [`LogScope::Workers`] — the shared worker log, opened in
//!   **append** mode so concurrent runs (or a crashed predecessor) are
//!   never truncated; line interleaving within a run is prevented by the
//!   sink's single worker loop.
//! - [`LogScope::Aggregator`] — the dedicated report log, truncated on
//!   creation; receives the aggregator's per-message lines and the final
//!   report.
//!
//! The sink is opened eagerly at construction so a bad path surfaces as
//! a [`SetupError`] before the run starts, and the orchestrator's
//! fail-fast contract holds.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::SetupError;
use crate::events::Event;

use super::Subscribe;
use super::log::{aggregator_line, worker_line};

/// Which event scope a [`FileLog`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogScope {
    /// Worker start/claim/finish lines (shared, append mode).
    Workers,
    /// Aggregator receive-loop lines and the final report (dedicated).
    Aggregator,
}

/// Appends one scope of rendered event lines to a file.
#[derive(Debug)]
pub struct FileLog {
    scope: LogScope,
    file: Mutex<tokio::fs::File>,
}

impl FileLog {
    /// Opens the sink for the given scope.
    ///
    /// Worker sinks open append-mode; aggregator sinks truncate, since
    /// each run owns its report log exclusively.
    pub fn create(path: &Path, scope: LogScope) -> Result<Self, SetupError> {
        let mut options = std::fs::OpenOptions::new();
        match scope {
            LogScope::Workers => options.append(true).create(true),
            LogScope::Aggregator => options.write(true).create(true).truncate(true),
        };
        let file = options.open(path).map_err(|source| SetupError::LogOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            scope,
            file: Mutex::new(tokio::fs::File::from_std(file)),
        })
    }

    fn render(&self, event: &Event) -> Option<String> {
        match self.scope {
            LogScope::Workers => worker_line(event),
            LogScope::Aggregator => aggregator_line(event),
        }
    }
}

#[async_trait]
impl Subscribe for FileLog {
    async fn on_event(&self, event: &Event) {
        let Some(line) = self.render(event) else {
            return;
        };
        let mut file = self.file.lock().await;
        let write = async {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await
        };
        if let Err(err) = write.await {
            eprintln!("[orderline] file sink write failed: {err}");
        }
    }

    fn name(&self) -> &'static str {
        match self.scope {
            LogScope::Workers => "worker-log",
            LogScope::Aggregator => "report-log",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::report::{FinalReport, WorkerTotals};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_worker_sink_records_only_worker_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.log");
        let sink = FileLog::create(&path, LogScope::Workers).unwrap();

        sink.on_event(
            &Event::new(EventKind::ChunkClaimed)
                .with_worker(1)
                .with_units(10)
                .with_duration(Duration::from_millis(5)),
        )
        .await;
        sink.on_event(&Event::new(EventKind::CompletionReceived).with_worker(1)).await;

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("going to make"));
        assert!(!text.contains("completed its task"));
    }

    #[tokio::test]
    async fn test_worker_sink_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worker.log");

        for units in [10u32, 20] {
            let sink = FileLog::create(&path, LogScope::Workers).unwrap();
            sink.on_event(
                &Event::new(EventKind::ChunkClaimed)
                    .with_worker(1)
                    .with_units(units)
                    .with_duration(Duration::from_millis(5)),
            )
            .await;
        }

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_aggregator_sink_truncates_and_records_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.log");
        std::fs::write(&path, "stale contents\n").unwrap();

        let sink = FileLog::create(&path, LogScope::Aggregator).unwrap();
        let report = FinalReport {
            order_size: 50,
            rows: vec![WorkerTotals { worker_id: 1, units: 50, iterations: 2 }],
        };
        sink.on_event(&Event::new(EventKind::ReportReady).with_report(Arc::new(report))).await;

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale contents"));
        assert!(text.contains("Final Report"));
    }

    #[test]
    fn test_unopenable_path_is_a_setup_error() {
        let err = FileLog::create(Path::new("/nonexistent-dir/x/report.log"), LogScope::Aggregator)
            .unwrap_err();
        assert!(matches!(err, SetupError::LogOpen { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
