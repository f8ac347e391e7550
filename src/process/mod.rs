/*!
 * Process Module
 * Distributed process table, launch/kill orchestration and reconciliation
 */

pub mod launch;
pub mod orchestrator;
pub mod preflight;
pub mod reconciler;
pub mod table;
pub mod types;

// Re-export for convenience
pub use launch::Invocation;
pub use orchestrator::{Launched, Orchestrator};
pub use preflight::run_preflight;
pub use reconciler::{ReconcileStats, Reconciler};
pub use table::DProcTable;
pub use types::{DProc, DProcKey, DProcKind, Interpreter, Phase, Source};
