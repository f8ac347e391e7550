/*!
 * Kubectl Gateway
 * Shells out to the control-plane CLI
 */

use super::traits::Gateway;
use super::types::ControlCommand;
use crate::core::config::ShellConfig;
use crate::core::errors::{GatewayError, GatewayResult, GatewayStep};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Gateway backed by a local kubectl binary
#[derive(Debug, Clone)]
pub struct KubectlGateway {
    binary: String,
    namespace: Option<String>,
}

impl KubectlGateway {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            namespace: None,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        let gateway = Self::new(config.kubectl_binary.clone());
        match config.namespace {
            Some(ref ns) => gateway.with_namespace(ns.clone()),
            None => gateway,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Full argument vector; the namespace goes right after the verb so it
    /// never lands behind a `--` separator
    fn argv(&self, command: &ControlCommand) -> Vec<String> {
        let mut argv = Vec::with_capacity(command.args.len() + 2);
        argv.push(command.verb.clone());
        if command.scoped {
            if let Some(ref ns) = self.namespace {
                argv.push(format!("--namespace={}", ns));
            }
        }
        argv.extend(command.args.iter().cloned());
        argv
    }
}

impl Gateway for KubectlGateway {
    fn run(&self, command: &ControlCommand) -> GatewayResult<String> {
        let argv = self.argv(command);
        let rendered = format!("{} {}", self.binary, argv.join(" "));
        debug!(command = %rendered, "executing");

        let output = Command::new(&self.binary)
            .args(&argv)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                GatewayError::new(
                    GatewayStep::Passthrough,
                    rendered.clone(),
                    format!("failed to execute {}: {}", self.binary, e),
                )
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let cause = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        warn!(command = %rendered, cause = %cause, "control-plane command failed");
        Err(GatewayError::new(GatewayStep::Passthrough, rendered, cause))
    }
}
