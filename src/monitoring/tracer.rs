/*!
 * Tracing
 * Structured logging setup and trace correlation for shell operations
 */

use crate::core::config::ShellConfig;
use tracing::debug;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Logs go to stderr so they never mix with command output.
/// - RUST_LOG: log filter (default: warn, or debug with KUBEDSH_DEBUG)
/// - KUBEDSH_TRACE_JSON: JSON output
pub fn init_tracing(config: &ShellConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.trace_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        debug!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(config.debug)
                    .with_line_number(config.debug)
                    .compact(),
            )
            .init();
        debug!("Structured tracing initialized");
    }
}

fn default_filter(config: &ShellConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "warn"
    }
}

/// Generate a unique trace ID for correlating the steps of one operation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}
