/*!
 * Shell Configuration
 * Environment-driven settings for the gateway, background tasks and launches
 *
 * Environment variables:
 * - KUBEDSH_DEBUG: enable debug logging
 * - KUBEDSH_NOPREPULL: skip pre-pulling launch images at interactive startup
 * - KUBECTL_BINARY: control-plane CLI to shell out to (default: kubectl)
 * - KUBEDSH_NAMESPACE: namespace applied to scoped gateway calls
 * - KUBEDSH_GC_INTERVAL_SECS: reconciler period (default: 30, min: 10)
 * - KUBEDSH_WATCH_INTERVAL_SECS: environment watchdog period (default: 2)
 * - KUBEDSH_TRACE_JSON: JSON log output
 */

use super::limits::*;
use crate::process::types::Interpreter;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level settings assembled at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ShellConfig {
    pub debug: bool,
    pub trace_json: bool,
    pub no_prepull: bool,
    pub kubectl_binary: String,
    pub namespace: Option<String>,
    pub gc_interval: Duration,
    pub watch_interval: Duration,
    pub launch: LaunchConfig,
}

impl ShellConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| !v.is_empty() && v != "0" && v != "false")
                .unwrap_or(false)
        };
        let secs = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let gc_interval = secs("KUBEDSH_GC_INTERVAL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GC_INTERVAL)
            .max(MIN_GC_INTERVAL);

        let watch_interval = secs("KUBEDSH_WATCH_INTERVAL_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_WATCH_INTERVAL);

        Self {
            debug: flag("KUBEDSH_DEBUG"),
            trace_json: flag("KUBEDSH_TRACE_JSON"),
            no_prepull: flag("KUBEDSH_NOPREPULL"),
            kubectl_binary: lookup("KUBECTL_BINARY")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_KUBECTL_BINARY.to_string()),
            namespace: lookup("KUBEDSH_NAMESPACE").filter(|v| !v.trim().is_empty()),
            gc_interval,
            watch_interval,
            launch: LaunchConfig::default(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Images and endpoint settings used when creating workloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LaunchConfig {
    pub python_image: String,
    pub node_image: String,
    pub ruby_image: String,
    pub binary_image: String,
    pub endpoint_port: u16,
    pub target_port: u16,
}

impl LaunchConfig {
    /// Every image a launch may use, deduplicated, in a stable order
    pub fn images(&self) -> Vec<&str> {
        let mut images: Vec<&str> = Vec::with_capacity(4);
        for image in [
            self.binary_image.as_str(),
            self.python_image.as_str(),
            self.node_image.as_str(),
            self.ruby_image.as_str(),
        ] {
            if !images.contains(&image) {
                images.push(image);
            }
        }
        images
    }

    /// Container image for a program launched with the given interpreter
    pub fn image_for(&self, interpreter: Option<Interpreter>) -> &str {
        match interpreter {
            Some(Interpreter::Python) => &self.python_image,
            Some(Interpreter::Node) => &self.node_image,
            Some(Interpreter::Ruby) => &self.ruby_image,
            None => &self.binary_image,
        }
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            python_image: DEFAULT_PYTHON_IMAGE.to_string(),
            node_image: DEFAULT_NODE_IMAGE.to_string(),
            ruby_image: DEFAULT_RUBY_IMAGE.to_string(),
            binary_image: DEFAULT_BINARY_IMAGE.to_string(),
            endpoint_port: DEFAULT_ENDPOINT_PORT,
            target_port: DEFAULT_TARGET_PORT,
        }
    }
}
