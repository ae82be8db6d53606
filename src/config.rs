//! # Run configuration.
//!
//! [`Config`] centralizes every knob of a simulation run: the order and
//! worker pool sizes, the per-worker capacity/latency sampling ranges,
//! the settling delay inserted between completion detection and the
//! final report, and the channel capacities of the runtime.
//!
//! ## Sentinel values
//! - `settle = 0s` → print permission is granted immediately
//! - `worker_log`/`report_log = None` → no file sink for that role
//!
//! ## Example
//! ```
//! use orderline::Config;
//!
//! let mut cfg = Config::default();
//! cfg.worker_count = 3;
//! cfg.order_size = 100;
//! assert!(cfg.validate().is_ok());
//! ```

use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

use crate::error::SetupError;

/// Upper bound on the worker pool size accepted by validation.
pub const MAX_WORKERS: u32 = 20;

/// Configuration for a single simulation run.
///
/// All fields are public; [`Config::validate`] is called by the
/// orchestrator before any resource is created, so an invalid
/// configuration never leaves partial state behind.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of workers drawing from the unit pool. Must be in `1..=MAX_WORKERS`.
    pub worker_count: u32,

    /// Total units requested. Must be positive.
    pub order_size: u32,

    /// Lower bound (inclusive) of the sampled per-worker chunk capacity.
    pub capacity_min: u32,
    /// Upper bound (inclusive) of the sampled per-worker chunk capacity.
    pub capacity_max: u32,

    /// Lower bound (inclusive) of the sampled per-chunk production latency.
    pub duration_min: Duration,
    /// Upper bound (inclusive) of the sampled per-chunk production latency.
    pub duration_max: Duration,

    /// Delay between completion detection and granting print permission.
    ///
    /// Lets in-flight log writes land before the final report is rendered.
    /// Quiescence heuristic only; correctness never depends on it.
    pub settle: Duration,

    /// Maximum wait for tasks to finish after a termination signal.
    pub grace: Duration,

    /// Capacity of the progress channel (workers → aggregator).
    ///
    /// Sends are fire-and-forget: a full channel drops the report rather
    /// than blocking the worker.
    pub channel_capacity: usize,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Shared append-mode sink for worker lines, if any.
    pub worker_log: Option<PathBuf>,

    /// Dedicated sink for aggregator lines and the final report, if any.
    pub report_log: Option<PathBuf>,
}

impl Config {
    /// Checks the run parameters, failing fast before any resource exists.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(SetupError::WorkerCount {
                given: self.worker_count,
                max: MAX_WORKERS,
            });
        }
        if self.order_size == 0 {
            return Err(SetupError::OrderSize { given: self.order_size });
        }
        if self.capacity_min == 0 || self.capacity_min > self.capacity_max {
            return Err(SetupError::CapacityBounds {
                min: self.capacity_min,
                max: self.capacity_max,
            });
        }
        if self.duration_min > self.duration_max {
            return Err(SetupError::DurationBounds {
                min: self.duration_min,
                max: self.duration_max,
            });
        }
        Ok(())
    }

    /// Samples a worker chunk capacity from `capacity_min..=capacity_max`.
    pub fn sample_capacity(&self) -> u32 {
        if self.capacity_min == self.capacity_max {
            return self.capacity_min;
        }
        rand::rng().random_range(self.capacity_min..=self.capacity_max)
    }

    /// Samples a per-chunk production latency from `duration_min..=duration_max`.
    pub fn sample_duration(&self) -> Duration {
        let lo = self.duration_min.as_millis() as u64;
        let hi = self.duration_max.as_millis() as u64;
        if lo == hi {
            return self.duration_min;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }

    /// Returns the progress channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn channel_capacity_clamped(&self) -> usize {
        self.channel_capacity.max(1)
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `worker_count = 1`, `order_size = 100`
    /// - `capacity = 10..=50` units per chunk
    /// - `duration = 500ms..=1200ms` per chunk
    /// - `settle = 2s`
    /// - `grace = 5s`
    /// - `channel_capacity = 1024`, `bus_capacity = 1024`
    /// - no file sinks
    fn default() -> Self {
        Self {
            worker_count: 1,
            order_size: 100,
            capacity_min: 10,
            capacity_max: 50,
            duration_min: Duration::from_millis(500),
            duration_max: Duration::from_millis(1200),
            settle: Duration::from_secs(2),
            grace: Duration::from_secs(5),
            channel_capacity: 1024,
            bus_capacity: 1024,
            worker_log: None,
            report_log: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut cfg = Config::default();
        cfg.worker_count = 3;
        cfg.order_size = 100;
        cfg
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut cfg = valid();
        cfg.worker_count = 0;
        assert!(matches!(
            cfg.validate(),
            Err(SetupError::WorkerCount { given: 0, .. })
        ));
    }

    #[test]
    fn test_too_many_workers_rejected() {
        let mut cfg = valid();
        cfg.worker_count = MAX_WORKERS + 1;
        assert!(matches!(cfg.validate(), Err(SetupError::WorkerCount { .. })));
    }

    #[test]
    fn test_max_workers_accepted() {
        let mut cfg = valid();
        cfg.worker_count = MAX_WORKERS;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_order_rejected() {
        let mut cfg = valid();
        cfg.order_size = 0;
        assert!(matches!(cfg.validate(), Err(SetupError::OrderSize { given: 0 })));
    }

    #[test]
    fn test_inverted_capacity_bounds_rejected() {
        let mut cfg = valid();
        cfg.capacity_min = 50;
        cfg.capacity_max = 10;
        assert!(matches!(cfg.validate(), Err(SetupError::CapacityBounds { .. })));
    }

    #[test]
    fn test_inverted_duration_bounds_rejected() {
        let mut cfg = valid();
        cfg.duration_min = Duration::from_millis(100);
        cfg.duration_max = Duration::from_millis(50);
        assert!(matches!(cfg.validate(), Err(SetupError::DurationBounds { .. })));
    }

    #[test]
    fn test_sampling_stays_in_bounds() {
        let cfg = valid();
        for _ in 0..200 {
            let c = cfg.sample_capacity();
            assert!((cfg.capacity_min..=cfg.capacity_max).contains(&c));
            let d = cfg.sample_duration();
            assert!(d >= cfg.duration_min && d <= cfg.duration_max);
        }
    }

    #[test]
    fn test_degenerate_sampling_range() {
        let mut cfg = valid();
        cfg.capacity_min = 7;
        cfg.capacity_max = 7;
        cfg.duration_min = Duration::from_millis(3);
        cfg.duration_max = Duration::from_millis(3);
        assert_eq!(cfg.sample_capacity(), 7);
        assert_eq!(cfg.sample_duration(), Duration::from_millis(3));
    }

    #[test]
    fn test_capacity_clamps() {
        let mut cfg = valid();
        cfg.channel_capacity = 0;
        cfg.bus_capacity = 0;
        assert_eq!(cfg.channel_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
