//! # Progress channel: workers → aggregator.
//!
//! A FIFO, multi-producer/single-consumer conduit carrying two message
//! kinds: [`Report::Production`] for each produced chunk and exactly one
//! [`Report::Completion`] per worker.
//!
//! ## Delivery policy
//! Sends are **fire-and-forget**. [`ProgressSender::send`] never blocks
//! and never retries: a full or closed channel drops the report and
//! tells the caller why, so the worker can log the drop and keep going.
//! A dropped production report degrades the final report's accuracy but
//! must never deadlock a worker or the run.
//!
//! No ordering is guaranteed between different workers' reports; each
//! sender's own reports arrive in the order they were sent.

use std::time::Duration;

use tokio::sync::mpsc;

/// A single progress message. Constructed by a worker, consumed exactly
/// once by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// One produced chunk.
    Production {
        /// Id of the reporting worker (1-based).
        worker_id: u32,
        /// The worker's fixed chunk capacity.
        capacity: u32,
        /// Units actually made this iteration (`<= capacity`).
        units: u32,
        /// Simulated production latency for this chunk.
        duration: Duration,
    },
    /// The worker's one-and-only completion notice.
    Completion {
        /// Id of the departing worker (1-based).
        worker_id: u32,
    },
}

impl Report {
    /// Id of the worker that sent this report.
    pub fn worker_id(&self) -> u32 {
        match self {
            Report::Production { worker_id, .. } => *worker_id,
            Report::Completion { worker_id } => *worker_id,
        }
    }
}

/// Why a fire-and-forget send dropped its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendDropped {
    /// The channel buffer was full.
    Full,
    /// The receiver is gone.
    Closed,
}

impl SendDropped {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SendDropped::Full => "channel_full",
            SendDropped::Closed => "channel_closed",
        }
    }
}

/// Creates the progress channel with the given buffer capacity.
pub fn channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender { tx }, ProgressReceiver { rx })
}

/// Cloneable sending half held by every worker.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<Report>,
}

impl ProgressSender {
    /// Hands a report to the channel without blocking.
    ///
    /// On failure the report is gone; the caller logs and proceeds.
    pub fn send(&self, report: Report) -> Result<(), SendDropped> {
        self.tx.try_send(report).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendDropped::Full,
            mpsc::error::TrySendError::Closed(_) => SendDropped::Closed,
        })
    }
}

/// Receiving half owned by the aggregator.
pub struct ProgressReceiver {
    rx: mpsc::Receiver<Report>,
}

impl ProgressReceiver {
    /// Waits for the next report. `None` means every sender is gone and
    /// no further report can ever arrive.
    pub async fn recv(&mut self) -> Option<Report> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_arrive_in_send_order_per_sender() {
        let (tx, mut rx) = channel(8);
        for units in [5u32, 7, 9] {
            tx.send(Report::Production {
                worker_id: 1,
                capacity: 10,
                units,
                duration: Duration::from_millis(1),
            })
            .unwrap();
        }
        tx.send(Report::Completion { worker_id: 1 }).unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(rx.recv().await.unwrap());
        }
        assert!(matches!(seen[0], Report::Production { units: 5, .. }));
        assert!(matches!(seen[1], Report::Production { units: 7, .. }));
        assert!(matches!(seen[2], Report::Production { units: 9, .. }));
        assert!(matches!(seen[3], Report::Completion { worker_id: 1 }));
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_blocking() {
        let (tx, _rx) = channel(1);
        tx.send(Report::Completion { worker_id: 1 }).unwrap();
        let err = tx.send(Report::Completion { worker_id: 2 }).unwrap_err();
        assert_eq!(err, SendDropped::Full);
        assert_eq!(err.as_label(), "channel_full");
    }

    #[tokio::test]
    async fn test_closed_channel_drops_without_blocking() {
        let (tx, rx) = channel(4);
        drop(rx);
        let err = tx.send(Report::Completion { worker_id: 1 }).unwrap_err();
        assert_eq!(err, SendDropped::Closed);
    }

    #[tokio::test]
    async fn test_recv_none_after_all_senders_drop() {
        let (tx, mut rx) = channel(4);
        let tx2 = tx.clone();
        tx2.send(Report::Completion { worker_id: 1 }).unwrap();
        drop(tx);
        drop(tx2);
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
