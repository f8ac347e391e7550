/*!
 * kubed-sh Library
 * Distributed process table, orchestration and background reconciliation
 * for a shell that runs programs as cluster workloads
 */

pub mod core;
pub mod env;
pub mod gateway;
pub mod monitoring;
pub mod process;
pub mod shell;
pub mod tasks;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::{LaunchConfig, ShellConfig};
pub use env::{EnvVars, Environments, ReloadSignal, ReloadWatchdog};
pub use gateway::{ControlCommand, ControlPlane, Gateway, KubectlGateway};
pub use monitoring::init_tracing;
pub use process::{DProc, DProcKind, DProcTable, Launched, Orchestrator, Reconciler, Source};
pub use shell::Shell;
pub use tasks::SupervisedTask;
