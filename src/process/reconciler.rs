/*!
 * Lifecycle Reconciler
 * Evicts table entries whose backing workload no longer exists
 */

use super::table::DProcTable;
use crate::gateway::{ControlPlane, Gateway};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconcileStats {
    pub checked: usize,
    pub evicted: usize,
    /// Entries whose existence could not be determined; they are kept
    pub errors: usize,
    pub duration_ms: u64,
}

pub struct Reconciler {
    dpt: Arc<DProcTable>,
    gateway: Arc<dyn Gateway>,
    interval: Duration,
}

impl Reconciler {
    pub fn new(dpt: Arc<DProcTable>, gateway: Arc<dyn Gateway>, interval: Duration) -> Self {
        Self {
            dpt,
            gateway,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one cycle: snapshot, query each entry's workload, evict the absent ones
    pub fn reconcile_once(&self) -> ReconcileStats {
        let start = Instant::now();
        let mut stats = ReconcileStats::default();

        for dproc in self.dpt.snapshot() {
            stats.checked += 1;
            match self.gateway.workload_exists(&dproc.id, &dproc.context) {
                Ok(true) => {}
                Ok(false) => {
                    if self.dpt.remove(&dproc) {
                        info!(
                            id = %dproc.id,
                            context = %dproc.context,
                            "Evicted distributed process with no backing workload"
                        );
                        stats.evicted += 1;
                    }
                }
                Err(e) => {
                    warn!(id = %dproc.id, context = %dproc.context, error = %e, "Could not check workload");
                    stats.errors += 1;
                }
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        stats
    }

    /// Perpetual reconciliation loop. The first cycle runs one interval after start.
    ///
    /// Gateway calls run on the blocking pool; a panic inside a cycle is
    /// re-raised so the owning supervisor can restart the loop.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval_at(
            tokio::time::Instant::now() + self.interval,
            self.interval,
        );
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("Reconciler started with {:?} interval", self.interval);

        loop {
            interval.tick().await;
            let this = Arc::clone(&self);
            match tokio::task::spawn_blocking(move || this.reconcile_once()).await {
                Ok(stats) if stats.evicted > 0 || stats.errors > 0 => {
                    info!(
                        checked = stats.checked,
                        evicted = stats.evicted,
                        errors = stats.errors,
                        duration_ms = stats.duration_ms,
                        "Reconciliation cycle complete"
                    );
                }
                Ok(stats) => debug!(checked = stats.checked, "Reconciliation cycle complete"),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    warn!(error = %e, "Reconciliation cycle cancelled");
                    return;
                }
            }
        }
    }
}
