/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for table and orchestrator operations
pub type DprocResult<T> = Result<T, DprocError>;

/// Result type for control-plane calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type for named environment operations
pub type EnvResult<T> = Result<T, EnvError>;

/// Named step of a multi-call control-plane sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStep {
    GetWorkload,
    CreateWorkload,
    AnnotateWorkload,
    ScaleWorkload,
    DeleteWorkload,
    ExposeEndpoint,
    DeleteEndpoint,
    RunOnce,
    CurrentContext,
    ListContexts,
    UseContext,
    ListWorkloads,
    Passthrough,
    Preflight,
    Prepull,
}

impl fmt::Display for GatewayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GatewayStep::GetWorkload => "get workload",
            GatewayStep::CreateWorkload => "create workload",
            GatewayStep::AnnotateWorkload => "annotate workload",
            GatewayStep::ScaleWorkload => "scale workload",
            GatewayStep::DeleteWorkload => "delete workload",
            GatewayStep::ExposeEndpoint => "expose endpoint",
            GatewayStep::DeleteEndpoint => "delete endpoint",
            GatewayStep::RunOnce => "run once",
            GatewayStep::CurrentContext => "get current context",
            GatewayStep::ListContexts => "list contexts",
            GatewayStep::UseContext => "switch context",
            GatewayStep::ListWorkloads => "list workloads",
            GatewayStep::Passthrough => "passthrough",
            GatewayStep::Preflight => "preflight check",
            GatewayStep::Prepull => "pre-pull image",
        };
        f.write_str(name)
    }
}

/// A failed control-plane call
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("{step} failed running `{command}`: {cause}")]
#[diagnostic(
    code(gateway::call_failed),
    help("The cluster may be unreachable or the current context may lack permissions.")
)]
pub struct GatewayError {
    pub step: GatewayStep,
    pub command: String,
    pub cause: String,
}

impl GatewayError {
    pub fn new(step: GatewayStep, command: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            step,
            command: command.into(),
            cause: cause.into(),
        }
    }

    /// Re-label the error with the step that issued the call
    pub fn at(mut self, step: GatewayStep) -> Self {
        self.step = step;
        self
    }
}

/// Distributed process errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum DprocError {
    #[error("Failed to discover distributed processes: {0}")]
    #[diagnostic(
        code(dpt::discovery_failed),
        help("The process table starts empty. Check cluster connectivity, it will be reconciled later.")
    )]
    Discovery(#[source] GatewayError),

    #[error("A distributed process with the ID '{id}' does not exist in context '{context}'")]
    #[diagnostic(
        code(dpt::not_found),
        help("Try the ps command to list distributed processes first.")
    )]
    NotFound { id: String, context: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid invocation: {0}")]
    #[diagnostic(
        code(launch::invalid_invocation),
        help("Launch a program as `<binary> [args] [&]` or `<python|node|ruby> <script> [args] [&]`.")
    )]
    InvalidInvocation(String),

    #[error("Distributed process '{id}' in context '{context}' is already {phase}")]
    #[diagnostic(
        code(orchestrator::invalid_transition),
        help("Wait for the running launch or kill of this process to finish.")
    )]
    InvalidTransition {
        id: String,
        context: String,
        phase: String,
    },

    #[error("Unrecognized process source: {0}")]
    #[diagnostic(
        code(dpt::unknown_source),
        help("Sources look like `bin:<path>` or `script:<interpreter>:<path>`.")
    )]
    UnknownSource(String),
}

impl DprocError {
    pub fn not_found(id: impl Into<String>, context: impl Into<String>) -> Self {
        DprocError::NotFound {
            id: id.into(),
            context: context.into(),
        }
    }

    /// The failing gateway step, when the error came from the control plane
    pub fn step(&self) -> Option<GatewayStep> {
        match self {
            DprocError::Gateway(e) | DprocError::Discovery(e) => Some(e.step),
            _ => None,
        }
    }
}

/// Named environment errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum EnvError {
    #[error("Environment '{0}' already exists")]
    #[diagnostic(code(env::exists), help("Use `env select` to switch to it."))]
    AlreadyExists(String),

    #[error("Environment '{0}' does not exist")]
    #[diagnostic(code(env::not_found), help("Use `env list` to see the available environments."))]
    NotFound(String),

    #[error("Environment '{0}' can't be deleted while it is selected")]
    #[diagnostic(code(env::selected), help("Select another environment first."))]
    Selected(String),

    #[error("The global environment can't be deleted")]
    #[diagnostic(code(env::global))]
    Global,

    #[error("'{0}' is not a valid environment name")]
    #[diagnostic(
        code(env::invalid_name),
        help("Names use letters, digits, `-` and `_`.")
    )]
    InvalidName(String),
}
