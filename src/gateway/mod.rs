/*!
 * Gateway Module
 * Cluster control-plane access
 */

pub mod kubectl;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use kubectl::KubectlGateway;
pub use traits::{ControlPlane, DiscoveredWorkload, Gateway};
pub use types::ControlCommand;

#[cfg(test)]
pub use traits::MockGateway;
