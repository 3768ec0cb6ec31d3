// tukangin_server/src/tasks.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, instrument, warn};
use tukangin::OrderEngine;

/// Periodically issues warranties for completed orders that have none.
/// Runs until the runtime shuts down.
pub fn spawn_warranty_reconciler(engine: Arc<OrderEngine>, period: Duration, batch_size: usize) -> JoinHandle<()> {
  info!(period_secs = period.as_secs(), batch_size, "Starting warranty reconciler.");
  tokio::spawn(async move {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    ticker.tick().await;
    loop {
      ticker.tick().await;
      reconcile_once(&engine, batch_size).await;
    }
  })
}

#[instrument(name = "task::reconcile_warranties", skip(engine))]
async fn reconcile_once(engine: &OrderEngine, batch_size: usize) {
  match engine.run_reconciliation(batch_size).await {
    Ok(report) if !report.issued.is_empty() || !report.failed.is_empty() => {
      info!(
        scanned = report.scanned,
        issued = report.issued.len(),
        already_present = report.already_present.len(),
        failed = report.failed.len(),
        "Warranty reconciliation pass finished."
      );
    }
    Ok(_) => {}
    Err(e) => warn!(error = %e, "Warranty reconciliation pass failed."),
  }
}
