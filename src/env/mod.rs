/*!
 * Environment Module
 * Named variable tables, the selected one, and its change watchdog
 */

pub mod registry;
pub mod vars;
pub mod watchdog;

// Re-export for convenience
pub use registry::{ActiveEnv, Environments};
pub use vars::{parse_assignment, EnvVars};
pub use watchdog::{ReloadSignal, ReloadWatchdog};
