/*!
 * Background Tasks
 * Supervision harness for the shell's perpetual loops
 */

pub mod supervisor;

pub use supervisor::{SupervisedTask, SupervisorCommand};
