/*!
 * Distributed Process Table
 * Locally cached registry of distributed processes, keyed by (id, context)
 *
 * The table is a cache of cluster state. Every operation holds the lock for
 * its full duration and never across a gateway call.
 */

use super::types::{DProc, DProcKey, DProcKind, Source};
use crate::core::errors::{DprocError, DprocResult};
use crate::gateway::{ControlPlane, Gateway};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct DProcTable {
    entries: Mutex<HashMap<DProcKey, DProc>>,
}

impl DProcTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table from every shell-owned workload visible in every context.
    ///
    /// All gateway calls happen before the lock is taken; a failure to list
    /// contexts inserts nothing. Contexts that cannot be queried are skipped.
    pub fn build(&self, gateway: &dyn Gateway) -> DprocResult<usize> {
        let contexts = gateway.list_contexts().map_err(DprocError::Discovery)?;

        let mut discovered = Vec::new();
        for context in &contexts {
            let workloads = match gateway.list_workloads(context) {
                Ok(w) => w,
                Err(e) => {
                    warn!(context = %context, error = %e, "Skipping unreachable context");
                    continue;
                }
            };

            for workload in workloads {
                let source = match workload.source.as_deref().map(str::parse::<Source>) {
                    Some(Ok(source)) => source,
                    Some(Err(e)) => {
                        warn!(id = %workload.name, error = %e, "Unreadable source, assuming binary");
                        Source::binary(workload.name.clone())
                    }
                    None => Source::binary(workload.name.clone()),
                };
                discovered.push(DProc::new(
                    workload.name,
                    DProcKind::LongRunning,
                    context.clone(),
                    source,
                ));
            }
        }

        let count = discovered.len();
        {
            let mut entries = self.entries.lock();
            for dproc in discovered {
                entries.insert(dproc.key(), dproc);
            }
        }

        info!(
            "Process table built: {} distributed processes across {} contexts",
            count,
            contexts.len()
        );
        Ok(count)
    }

    /// Insert or overwrite the entry for (id, context)
    pub fn add(&self, dproc: DProc) {
        debug!(id = %dproc.id, context = %dproc.context, "Adding distributed process");
        self.entries.lock().insert(dproc.key(), dproc);
    }

    /// Remove the entry for (id, context); absent keys are a no-op.
    /// Returns whether an entry was removed.
    pub fn remove(&self, dproc: &DProc) -> bool {
        self.remove_key(&dproc.key())
    }

    pub fn remove_key(&self, key: &DProcKey) -> bool {
        let removed = self.entries.lock().remove(key).is_some();
        if removed {
            debug!(id = %key.id, context = %key.context, "Removed distributed process");
        }
        removed
    }

    pub fn get(&self, id: &str, context: &str) -> DprocResult<DProc> {
        self.entries
            .lock()
            .get(&DProcKey::new(id, context))
            .cloned()
            .ok_or_else(|| DprocError::not_found(id, context))
    }

    pub fn contains(&self, id: &str, context: &str) -> bool {
        self.entries
            .lock()
            .contains_key(&DProcKey::new(id, context))
    }

    /// Entries of `context` sorted by id; an empty context selects every context
    pub fn dump(&self, context: &str) -> Vec<DProc> {
        let mut out: Vec<DProc> = {
            let entries = self.entries.lock();
            entries
                .values()
                .filter(|d| context.is_empty() || d.context == context)
                .cloned()
                .collect()
        };
        out.sort_by(|a, b| a.key().cmp(&b.key()));
        out
    }

    /// Copy of every entry, for work that must happen outside the lock
    pub fn snapshot(&self) -> Vec<DProc> {
        self.dump("")
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
