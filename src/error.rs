//! Error types used by the orderline runtime.
//!
//! This module defines two main error enums:
//!
//! - [`SetupError`] — invalid run parameters or failed resource creation;
//!   always fatal and always raised before any shared resource exists.
//! - [`RuntimeError`] — failures of a live run: signal-driven
//!   interruption, a lost aggregator role, or an overrun grace window.
//!
//! Both types provide `as_label` for stable log/metric identifiers and
//! `exit_code` mapping the CLI contract: `1` invalid invocation, `2`
//! failure of a subordinate role, `128` signal-induced termination.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while validating parameters or creating run resources.
///
/// A setup error aborts the run immediately; no partial resource is left
/// behind because validation runs before anything is created.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SetupError {
    /// Worker pool size outside the accepted range.
    #[error("worker count {given} outside 1..={max}")]
    WorkerCount {
        /// The rejected value.
        given: u32,
        /// The configured maximum.
        max: u32,
    },

    /// Order size must be positive.
    #[error("order size must be positive (got {given})")]
    OrderSize {
        /// The rejected value.
        given: u32,
    },

    /// Capacity sampling bounds are empty or start at zero.
    #[error("capacity bounds {min}..={max} are invalid")]
    CapacityBounds { min: u32, max: u32 },

    /// Duration sampling bounds are inverted.
    #[error("duration bounds {min:?}..={max:?} are invalid")]
    DurationBounds { min: Duration, max: Duration },

    /// A log sink could not be opened.
    #[error("failed to open log sink {path:?}: {source}")]
    LogOpen {
        /// The sink path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl SetupError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SetupError::WorkerCount { .. } => "setup_worker_count",
            SetupError::OrderSize { .. } => "setup_order_size",
            SetupError::CapacityBounds { .. } => "setup_capacity_bounds",
            SetupError::DurationBounds { .. } => "setup_duration_bounds",
            SetupError::LogOpen { .. } => "setup_log_open",
        }
    }

    /// Process exit code for this error.
    ///
    /// Invalid invocation arguments map to `1`; a sink that cannot be
    /// opened counts as a failed role launch and maps to `2`.
    pub fn exit_code(&self) -> i32 {
        match self {
            SetupError::LogOpen { .. } => 2,
            _ => 1,
        }
    }
}

/// Errors raised by a running simulation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The run was interrupted by a termination signal (or an external
    /// cancel). A control path, not a defect — but surfaced distinctly
    /// so callers can exit with a non-zero status.
    #[error("interrupted by termination signal")]
    Interrupted,

    /// The aggregator task ended without producing a final report.
    #[error("aggregator lost before the final report: {reason}")]
    AggregatorLost {
        /// Diagnostic description of how the role was lost.
        reason: String,
    },

    /// Tasks did not finish within the grace window after interruption.
    #[error("shutdown grace {grace:?} exceeded; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Interrupted => "runtime_interrupted",
            RuntimeError::AggregatorLost { .. } => "runtime_aggregator_lost",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Interrupted => 128,
            RuntimeError::GraceExceeded { .. } => 128,
            RuntimeError::AggregatorLost { .. } => 2,
        }
    }
}
