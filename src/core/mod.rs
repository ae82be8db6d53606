//! Runtime core: the three roles and signal handling.
//!
//! This module contains the run-time machinery of the simulator:
//!
//! - [`orchestrator`]: creates shared resources, spawns the tree, drives
//!   completion/interruption, and tears everything down exactly once;
//! - [`worker`]: the bounded-chunk claim loop and completion notice;
//! - [`aggregator`]: the progress consumer, completion detector, and
//!   final-report producer;
//! - [`shutdown`]: OS termination-signal handling.

mod aggregator;
mod orchestrator;
mod shutdown;
mod worker;

pub use aggregator::Aggregator;
pub use orchestrator::Orchestrator;
pub use worker::{Worker, WorkerSummary};
