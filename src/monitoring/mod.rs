/*!
 * Monitoring Module
 * Structured tracing for the shell and its background tasks
 */

pub mod tracer;

pub use tracer::{generate_trace_id, init_tracing};
