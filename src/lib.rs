//! # orderline
//!
//! **Orderline** simulates fulfillment of a production order by a pool
//! of concurrent workers drawing from a shared, finite unit pool,
//! coordinated by an aggregator and supervised by an orchestrator that
//! owns every shared resource's lifecycle.
//!
//! ## Architecture
//! ```text
//!              ┌──────────────────────────────────────────────┐
//!              │  Orchestrator                                │
//!              │  - creates OrderBook, channel, gates, sinks  │
//!              │  - spawns aggregator + workers (JoinSet)     │
//!              │  - handles SIGINT/SIGTERM → cancel tree      │
//!              │  - settling delay → print permission         │
//!              │  - reaps children, teardown exactly once     │
//!              └───────┬───────────────────────────┬──────────┘
//!                      ▼                           ▼
//!          ┌──────────────┐  ...  ┌──────────────┐   ┌──────────────┐
//!          │  Worker # 1  │       │  Worker # N  │   │  Aggregator  │
//!          │ (claim loop) │       │ (claim loop) │   │ (recv loop)  │
//!          └──┬────────┬──┘       └──┬────────┬──┘   └──────┬───────┘
//!             │        │ claim()     │        │             │
//!             │        ▼             │        ▼             │
//!             │   ┌────────────────────────────────┐        │
//!             │   │ OrderBook (mutexed unit pool)  │◄───────┤ worker_done()
//!             │   └────────────────────────────────┘        │
//!             │                      │                      │
//!             └── Production/Completion reports (mpsc) ─────┘
//!                                                           │
//!                         done gate ◄───────────────────────┤
//!                         print gate ──────────────────────►│
//!                                                           ▼
//!                                                     Final report
//! ```
//!
//! ## Protocol
//! - Each worker atomically claims `min(capacity, remaining)` units
//!   under the order book's lock — the run's only critical section —
//!   then simulates production latency and reports the chunk
//!   fire-and-forget on the progress channel.
//! - The aggregator counts exactly one completion notice per worker;
//!   at zero it opens the `done` gate, and renders the final report
//!   only after the orchestrator's `print` gate opens.
//! - Every runtime event is published on a broadcast [`Bus`] and fanned
//!   out to [`Subscribe`] sinks (stdout, worker log, report log).
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use orderline::{Config, LogWriter, Orchestrator, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.worker_count = 3;
//!     cfg.order_size = 200;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let mut orch = Orchestrator::new(cfg, subs)?;
//!     let report = orch.run().await?;
//!     assert!(report.fulfilled());
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod progress;
mod rendezvous;
mod report;
mod state;
mod subscribers;

// ---- Public re-exports ----

pub use config::{Config, MAX_WORKERS};
pub use core::{Aggregator, Orchestrator, Worker, WorkerSummary};
pub use error::{RuntimeError, SetupError};
pub use events::{Bus, Event, EventKind};
pub use progress::{ProgressReceiver, ProgressSender, Report, SendDropped, channel};
pub use rendezvous::Gate;
pub use report::{FinalReport, WorkerTotals};
pub use state::{OrderBook, PoolSnapshot};
pub use subscribers::{FileLog, LogScope, LogWriter, Subscribe, SubscriberSet};
