/*!
 * Core Module
 * Fundamental shell types, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;

// Re-export for convenience
pub use config::{LaunchConfig, ShellConfig};
pub use errors::*;
