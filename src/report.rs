//! # Final report data model.
//!
//! [`FinalReport`] is the authoritative summary the aggregator produces
//! after every worker has completed and print permission was granted:
//! per-worker totals and iteration counts, plus the grand total compared
//! against the requested order size.

use std::fmt;

/// Accumulated totals for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerTotals {
    /// Worker id (1-based).
    pub worker_id: u32,
    /// Units this worker produced over the whole run.
    pub units: u32,
    /// Number of chunks this worker produced.
    pub iterations: u32,
}

/// The aggregator's final summary of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalReport {
    /// Units originally requested.
    pub order_size: u32,
    /// One row per worker, ordered by worker id.
    pub rows: Vec<WorkerTotals>,
}

impl FinalReport {
    /// Sum of units across all workers.
    pub fn grand_total(&self) -> u32 {
        self.rows.iter().map(|r| r.units).sum()
    }

    /// True when the grand total matches the requested order exactly.
    ///
    /// Holds on every successful run; a mismatch means production
    /// reports were dropped along the way.
    pub fn fulfilled(&self) -> bool {
        self.grand_total() == self.order_size
    }
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "****** Final Report ******")?;
        for row in &self.rows {
            writeln!(
                f,
                "Worker # {:2} made a total of {:4} units in {:5} iterations",
                row.worker_id, row.units, row.iterations
            )?;
        }
        writeln!(f, "==============================")?;
        write!(
            f,
            "Grand total units made = {:5}   vs  order size of {:5}",
            self.grand_total(),
            self.order_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grand_total_sums_rows() {
        let report = FinalReport {
            order_size: 100,
            rows: vec![
                WorkerTotals { worker_id: 1, units: 60, iterations: 2 },
                WorkerTotals { worker_id: 2, units: 40, iterations: 1 },
            ],
        };
        assert_eq!(report.grand_total(), 100);
        assert!(report.fulfilled());
    }

    #[test]
    fn test_unfulfilled_when_reports_dropped() {
        let report = FinalReport {
            order_size: 100,
            rows: vec![WorkerTotals { worker_id: 1, units: 90, iterations: 3 }],
        };
        assert!(!report.fulfilled());
    }

    #[test]
    fn test_display_lists_every_worker_and_grand_total() {
        let report = FinalReport {
            order_size: 100,
            rows: vec![
                WorkerTotals { worker_id: 1, units: 60, iterations: 2 },
                WorkerTotals { worker_id: 2, units: 40, iterations: 1 },
            ],
        };
        let text = report.to_string();
        assert!(text.contains("Final Report"));
        assert!(text.contains("Worker #  1"));
        assert!(text.contains("Worker #  2"));
        assert!(text.contains("Grand total units made =   100"));
        assert!(text.contains("order size of   100"));
    }
}
