/*!
 * Gateway Traits
 * Control-plane abstractions consumed by the process table and orchestrator
 */

use super::types::ControlCommand;
use crate::core::errors::{GatewayResult, GatewayStep};
use crate::core::limits::{OWNER_LABEL_KEY, OWNER_LABEL_VALUE, SOURCE_ANNOTATION};
use crate::process::types::Source;

/// Executes control-plane commands and returns their raw text output
#[cfg_attr(test, mockall::automock)]
pub trait Gateway: Send + Sync {
    fn run(&self, command: &ControlCommand) -> GatewayResult<String>;
}

/// A workload found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredWorkload {
    pub name: String,
    /// Raw source annotation, if the workload carries one
    pub source: Option<String>,
}

/// Named control-plane steps, available on every [`Gateway`]
pub trait ControlPlane: Gateway {
    fn call(&self, step: GatewayStep, command: ControlCommand) -> GatewayResult<String> {
        tracing::debug!(step = %step, command = %command, "gateway call");
        self.run(&command).map_err(|e| e.at(step))
    }

    fn get_workload(&self, id: &str) -> GatewayResult<String> {
        self.call(
            GatewayStep::GetWorkload,
            ControlCommand::scoped("get").args(["deployment", id]),
        )
    }

    /// Existence check against an explicit context; absent is `Ok(false)`
    fn workload_exists(&self, id: &str, context: &str) -> GatewayResult<bool> {
        let out = self.call(
            GatewayStep::GetWorkload,
            ControlCommand::scoped("get")
                .args(["deployment", id])
                .arg(format!("--context={}", context))
                .args(["--ignore-not-found", "-o", "name"]),
        )?;
        Ok(!out.trim().is_empty())
    }

    fn create_workload(&self, id: &str, image: &str, command: &[String]) -> GatewayResult<String> {
        self.call(
            GatewayStep::CreateWorkload,
            ControlCommand::scoped("create")
                .args(["deployment", id])
                .arg(format!("--image={}", image))
                .arg("--")
                .args(command.iter().cloned()),
        )
    }

    /// Mark a workload as owned by the shell and record its source
    fn annotate_workload(&self, id: &str, source: &Source) -> GatewayResult<()> {
        self.call(
            GatewayStep::AnnotateWorkload,
            ControlCommand::scoped("label")
                .args(["deployment", id])
                .arg(format!("{}={}", OWNER_LABEL_KEY, OWNER_LABEL_VALUE))
                .arg("--overwrite"),
        )?;
        self.call(
            GatewayStep::AnnotateWorkload,
            ControlCommand::scoped("annotate")
                .args(["deployment", id])
                .arg(format!("{}={}", SOURCE_ANNOTATION, source))
                .arg("--overwrite"),
        )?;
        Ok(())
    }

    fn expose_workload(&self, id: &str, port: u16, target_port: u16) -> GatewayResult<String> {
        self.call(
            GatewayStep::ExposeEndpoint,
            ControlCommand::scoped("expose")
                .args(["deployment", id])
                .arg(format!("--name={}", id))
                .arg(format!("--port={}", port))
                .arg(format!("--target-port={}", target_port)),
        )
    }

    fn scale_workload(&self, id: &str, replicas: u32) -> GatewayResult<String> {
        self.call(
            GatewayStep::ScaleWorkload,
            ControlCommand::scoped("scale")
                .arg(format!("--replicas={}", replicas))
                .args(["deployment", id]),
        )
    }

    fn delete_workload(&self, id: &str) -> GatewayResult<String> {
        self.call(
            GatewayStep::DeleteWorkload,
            ControlCommand::scoped("delete").args(["deployment", id]),
        )
    }

    fn delete_endpoint(&self, name: &str) -> GatewayResult<String> {
        self.call(
            GatewayStep::DeleteEndpoint,
            ControlCommand::scoped("delete").args(["service", name]),
        )
    }

    /// One-shot pod that is never restarted. It runs attached and is removed
    /// once it exits, so its name is free again for the next run.
    fn run_once(&self, name: &str, image: &str, command: &[String]) -> GatewayResult<String> {
        self.call(GatewayStep::RunOnce, one_shot_pod(name, image, command))
    }

    /// Pull `image` onto a node by running a no-op pod from it
    fn prepull_image(&self, name: &str, image: &str) -> GatewayResult<String> {
        self.call(
            GatewayStep::Prepull,
            one_shot_pod(name, image, &["true".to_string()]),
        )
    }

    /// Check the control-plane CLI is installed and runnable
    fn client_version(&self) -> GatewayResult<String> {
        self.call(
            GatewayStep::Preflight,
            ControlCommand::global("version").arg("--client"),
        )
    }

    fn current_context(&self) -> GatewayResult<String> {
        self.call(
            GatewayStep::CurrentContext,
            ControlCommand::global("config").arg("current-context"),
        )
        .map(|out| out.trim().to_string())
    }

    fn list_contexts(&self) -> GatewayResult<Vec<String>> {
        let out = self.call(
            GatewayStep::ListContexts,
            ControlCommand::global("config").args(["get-contexts", "-o", "name"]),
        )?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Human-readable context listing
    fn describe_contexts(&self) -> GatewayResult<String> {
        self.call(
            GatewayStep::ListContexts,
            ControlCommand::global("config").arg("get-contexts"),
        )
    }

    fn use_context(&self, context: &str) -> GatewayResult<String> {
        self.call(
            GatewayStep::UseContext,
            ControlCommand::global("config").args(["use-context", context]),
        )
    }

    /// Shell-owned workloads in `context`, with their source annotation
    fn list_workloads(&self, context: &str) -> GatewayResult<Vec<DiscoveredWorkload>> {
        let columns = format!(
            "custom-columns=NAME:.metadata.name,SOURCE:.metadata.annotations.{}",
            SOURCE_ANNOTATION
        );
        let out = self.call(
            GatewayStep::ListWorkloads,
            ControlCommand::scoped("get")
                .arg("deployments")
                .arg(format!("--context={}", context))
                .arg(format!("--selector={}={}", OWNER_LABEL_KEY, OWNER_LABEL_VALUE))
                .args(["-o", columns.as_str(), "--no-headers"]),
        )?;
        Ok(parse_workload_listing(&out))
    }

    fn passthrough(&self, verb: &str, args: &[String]) -> GatewayResult<String> {
        self.call(
            GatewayStep::Passthrough,
            ControlCommand::scoped(verb).args(args.iter().cloned()),
        )
    }
}

impl<G: Gateway + ?Sized> ControlPlane for G {}

fn one_shot_pod(name: &str, image: &str, command: &[String]) -> ControlCommand {
    ControlCommand::scoped("run")
        .arg(name)
        .args(["-i", "--rm"])
        .arg(format!("--image={}", image))
        .arg("--restart=Never")
        .arg(format!("--labels={}={}", OWNER_LABEL_KEY, OWNER_LABEL_VALUE))
        .arg("--")
        .args(command.iter().cloned())
}

fn parse_workload_listing(out: &str) -> Vec<DiscoveredWorkload> {
    out.lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let name = cols.next()?;
            let source = cols
                .next()
                .filter(|s| *s != "<none>")
                .map(String::from);
            Some(DiscoveredWorkload {
                name: name.to_string(),
                source,
            })
        })
        .collect()
}
