//! Command-line entry point: `orderline <worker_count> <order_size>`.
//!
//! Exit codes: `0` success, `1` invalid invocation, `2` a subordinate
//! role failed, `128` signal-induced termination.

use std::process::ExitCode;
use std::sync::Arc;

use orderline::{Config, LogWriter, Orchestrator, Subscribe};

fn parse_args() -> Option<(u32, u32)> {
    let mut args = std::env::args().skip(1);
    let workers = args.next()?.parse().ok()?;
    let order = args.next()?.parse().ok()?;
    if args.next().is_some() {
        return None;
    }
    Some((workers, order))
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some((worker_count, order_size)) = parse_args() else {
        eprintln!("Usage: orderline <worker_count> <order_size>");
        return ExitCode::from(1);
    };

    let mut cfg = Config::default();
    cfg.worker_count = worker_count;
    cfg.order_size = order_size;
    cfg.worker_log = Some("worker.log".into());
    cfg.report_log = Some("report.log".into());

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let mut orch = match Orchestrator::new(cfg, subs) {
        Ok(orch) => orch,
        Err(err) => {
            eprintln!("orderline: {err}");
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    match orch.run().await {
        Ok(report) => {
            if !report.fulfilled() {
                eprintln!(
                    "orderline: grand total {} does not match order size {}",
                    report.grand_total(),
                    report.order_size
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("orderline: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
