/*!
 * Launch/Kill Orchestrator
 * Drives a distributed process through absent -> launching -> registered -> killing -> absent
 *
 * Gateway steps fail fast and report which step failed. Cluster-side changes
 * made before a failure stay in place; the table is only touched once all
 * preceding steps succeeded.
 */

use super::launch::Invocation;
use super::table::DProcTable;
use super::types::{DProc, DProcKey, DProcKind, Phase};
use crate::core::config::LaunchConfig;
use crate::core::errors::{DprocError, DprocResult};
use crate::gateway::{ControlPlane, Gateway};
use crate::monitoring::generate_trace_id;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, info_span, warn};

/// Result of a successful launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub id: String,
    pub kind: DProcKind,
    /// Output of a foreground run; empty for long-running processes
    pub output: String,
}

pub struct Orchestrator {
    dpt: Arc<DProcTable>,
    gateway: Arc<dyn Gateway>,
    config: LaunchConfig,
    in_flight: DashMap<DProcKey, Phase>,
}

/// Clears the in-flight phase of a key when dropped
struct PhaseGuard<'a> {
    in_flight: &'a DashMap<DProcKey, Phase>,
    key: DProcKey,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

impl Orchestrator {
    pub fn new(dpt: Arc<DProcTable>, gateway: Arc<dyn Gateway>, config: LaunchConfig) -> Self {
        Self {
            dpt,
            gateway,
            config,
            in_flight: DashMap::new(),
        }
    }

    pub fn table(&self) -> &Arc<DProcTable> {
        &self.dpt
    }

    /// Phase of an (id, context) pair that is mid-transition, if any
    pub fn phase(&self, id: &str, context: &str) -> Option<Phase> {
        self.in_flight
            .get(&DProcKey::new(id, context))
            .map(|r| *r.value())
    }

    fn begin(&self, key: DProcKey, phase: Phase) -> DprocResult<PhaseGuard<'_>> {
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(current) => Err(DprocError::InvalidTransition {
                id: key.id,
                context: key.context,
                phase: current.get().to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(phase);
                Ok(PhaseGuard {
                    in_flight: &self.in_flight,
                    key,
                })
            }
        }
    }

    /// Launch a program described by a command line.
    ///
    /// Background invocations (trailing `&`) become long-running workloads
    /// with an endpoint and a table entry. Others run once, attached, and
    /// their output is returned; they are not tracked.
    pub fn launch(&self, line: &str) -> DprocResult<Launched> {
        let invocation = Invocation::parse(line)?;
        let id = invocation.id()?;
        let context = self.gateway.current_context()?;
        let _phase = self.begin(DProcKey::new(&id, &context), Phase::Launching)?;

        let span = info_span!("launch", trace_id = %generate_trace_id(), id = %id, context = %context);
        let _enter = span.enter();

        let result = self.launch_steps(&id, &context, &invocation);
        match result {
            Ok(_) => info!(kind = %invocation.kind(), "Launched distributed process"),
            Err(ref e) => warn!(line = %line, error = %e, "Launch failed"),
        }
        result.map(|output| Launched {
            id,
            kind: invocation.kind(),
            output,
        })
    }

    fn launch_steps(&self, id: &str, context: &str, invocation: &Invocation) -> DprocResult<String> {
        let image = self.config.image_for(invocation.interpreter);
        let command = invocation.container_command();

        if invocation.kind() == DProcKind::Ephemeral {
            return Ok(self.gateway.run_once(id, image, &command)?);
        }

        let source = invocation.source();
        self.gateway.create_workload(id, image, &command)?;
        self.gateway.annotate_workload(id, &source)?;
        self.gateway
            .expose_workload(id, self.config.endpoint_port, self.config.target_port)?;

        self.dpt
            .add(DProc::new(id, DProcKind::LongRunning, context, source));
        Ok(String::new())
    }

    /// Tear down a tracked process in the current context: workload,
    /// endpoint, then table entry.
    pub fn kill(&self, id: &str) -> DprocResult<()> {
        let context = self.gateway.current_context()?;
        let _phase = self.begin(DProcKey::new(id, &context), Phase::Killing)?;

        let span = info_span!("kill", trace_id = %generate_trace_id(), id = %id, context = %context);
        let _enter = span.enter();

        let result = self.kill_steps(id, &context);
        match result {
            Ok(()) => info!("Killed distributed process"),
            Err(ref e) => warn!(error = %e, "Kill failed"),
        }
        result
    }

    fn kill_steps(&self, id: &str, context: &str) -> DprocResult<()> {
        if self.gateway.get_workload(id).is_err() {
            return Err(DprocError::not_found(id, context));
        }

        self.gateway.scale_workload(id, 0)?;
        self.gateway.delete_workload(id)?;

        let dproc = self.dpt.get(id, context)?;
        let endpoint = dproc.source.endpoint_name()?;
        self.gateway.delete_endpoint(&endpoint)?;

        self.dpt.remove(&dproc);
        Ok(())
    }
}
