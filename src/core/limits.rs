/*!
 * Shell Limits and Constants
 *
 * Intervals, defaults and naming conventions shared by the process table,
 * the background tasks and the gateway.
 */

use std::time::Duration;

// =============================================================================
// BACKGROUND TASK INTERVALS
// =============================================================================

/// Default period between reconciliation cycles
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(30);

/// Floor for the reconciliation period, keeps the cluster API from being flooded
pub const MIN_GC_INTERVAL: Duration = Duration::from_secs(10);

/// Default period between environment fingerprint checks
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(2);

/// Delay before a panicked background task is restarted
pub const SUPERVISOR_RESTART_DELAY: Duration = Duration::from_secs(1);

/// Capacity of the reload signal broadcast channel
pub const RELOAD_CHANNEL_CAPACITY: usize = 16;

// =============================================================================
// CLUSTER NAMING CONVENTIONS
// =============================================================================

/// Label key/value marking workloads owned by this shell
pub const OWNER_LABEL_KEY: &str = "gen";
pub const OWNER_LABEL_VALUE: &str = "kubed-sh";

/// Annotation recording how a long-running workload was launched
pub const SOURCE_ANNOTATION: &str = "kubed-sh/source";

/// Maximum length of a DNS-1123 label (workload and endpoint names)
pub const MAX_DPROC_ID_LEN: usize = 63;

// =============================================================================
// LAUNCH DEFAULTS
// =============================================================================

pub const DEFAULT_KUBECTL_BINARY: &str = "kubectl";
pub const DEFAULT_PYTHON_IMAGE: &str = "python:3.6-alpine";
pub const DEFAULT_NODE_IMAGE: &str = "node:9.4-alpine";
pub const DEFAULT_RUBY_IMAGE: &str = "ruby:2.5-alpine";
pub const DEFAULT_BINARY_IMAGE: &str = "quay.io/mhausenblas/jump:v0.1";

/// Endpoint port exposed by long-running processes
pub const DEFAULT_ENDPOINT_PORT: u16 = 80;

/// Container port the endpoint forwards to
pub const DEFAULT_TARGET_PORT: u16 = 8080;

/// Name of the one-shot pod used by the curl command
pub const CURL_POD_NAME: &str = "curljump";

/// Name prefix of the one-shot pods that warm the node image cache
pub const PREPULL_POD_PREFIX: &str = "prepull";

// =============================================================================
// ENVIRONMENTS
// =============================================================================

/// Environment created and selected at startup
pub const GLOBAL_ENV: &str = "global";
