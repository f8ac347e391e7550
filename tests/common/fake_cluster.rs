/*!
 * Fake Cluster
 * In-memory control plane that answers the commands the shell issues
 */

#![allow(dead_code)]

use kubed_sh::{ControlCommand, Gateway, GatewayError, GatewayResult, GatewayStep};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const MUTATING_VERBS: [&str; 7] = ["create", "label", "annotate", "expose", "scale", "delete", "run"];

#[derive(Default)]
struct State {
    current: String,
    contexts: Vec<String>,
    /// (context, name) -> source annotation
    deployments: BTreeMap<(String, String), Option<String>>,
    services: BTreeSet<(String, String)>,
    pods: BTreeSet<(String, String)>,
}

pub struct FakeCluster {
    state: Mutex<State>,
    calls: Mutex<Vec<ControlCommand>>,
    failing: Mutex<HashSet<String>>,
    unreachable: Mutex<bool>,
}

impl FakeCluster {
    pub fn new(current: &str, contexts: &[&str]) -> Self {
        Self {
            state: Mutex::new(State {
                current: current.to_string(),
                contexts: contexts.iter().map(|c| c.to_string()).collect(),
                ..State::default()
            }),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            unreachable: Mutex::new(false),
        }
    }

    /// Make every command whose rendered form starts with `prefix` fail
    pub fn fail_on(&self, prefix: &str) {
        self.failing.lock().insert(prefix.to_string());
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock() = unreachable;
    }

    /// Workload created by someone other than the shell
    pub fn seed_workload(&self, context: &str, name: &str, source: Option<&str>) {
        self.state.lock().deployments.insert(
            (context.to_string(), name.to_string()),
            source.map(String::from),
        );
    }

    /// Out-of-band deletion, bypassing the shell
    pub fn delete_out_of_band(&self, context: &str, name: &str) {
        self.state
            .lock()
            .deployments
            .remove(&(context.to_string(), name.to_string()));
    }

    pub fn has_workload(&self, context: &str, name: &str) -> bool {
        self.state
            .lock()
            .deployments
            .contains_key(&(context.to_string(), name.to_string()))
    }

    pub fn has_endpoint(&self, context: &str, name: &str) -> bool {
        self.state
            .lock()
            .services
            .contains(&(context.to_string(), name.to_string()))
    }

    /// A one-shot pod that was left behind after its run
    pub fn has_pod(&self, context: &str, name: &str) -> bool {
        self.state
            .lock()
            .pods
            .contains(&(context.to_string(), name.to_string()))
    }

    pub fn calls(&self) -> Vec<ControlCommand> {
        self.calls.lock().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| MUTATING_VERBS.contains(&c.verb.as_str()))
            .count()
    }

    fn fail(command: &ControlCommand, cause: impl Into<String>) -> GatewayError {
        GatewayError::new(GatewayStep::Passthrough, format!("kubectl {}", command), cause)
    }

    fn handle(&self, command: &ControlCommand) -> GatewayResult<String> {
        let mut state = self.state.lock();
        let args = &command.args;
        let context = flag_value(args, "--context=").unwrap_or_else(|| state.current.clone());

        match command.verb.as_str() {
            "config" => match args.first().map(String::as_str) {
                Some("current-context") => Ok(format!("{}\n", state.current)),
                Some("get-contexts") if command.has_arg("name") => {
                    Ok(state.contexts.iter().map(|c| format!("{}\n", c)).collect())
                }
                Some("get-contexts") => Ok(state
                    .contexts
                    .iter()
                    .map(|c| {
                        let marker = if *c == state.current { "*" } else { " " };
                        format!("{} {}\n", marker, c)
                    })
                    .collect()),
                Some("use-context") => {
                    let target = args.get(1).cloned().unwrap_or_default();
                    if state.contexts.contains(&target) {
                        state.current = target.clone();
                        Ok(format!("Switched to context \"{}\".\n", target))
                    } else {
                        Err(Self::fail(command, format!("no context exists with the name: \"{}\"", target)))
                    }
                }
                _ => Err(Self::fail(command, "unknown config command")),
            },
            "get" if command.has_arg("deployments") => Ok(state
                .deployments
                .iter()
                .filter(|((ctx, _), _)| *ctx == context)
                .map(|((_, name), source)| {
                    format!("{}   {}\n", name, source.as_deref().unwrap_or("<none>"))
                })
                .collect()),
            "get" => {
                let name = resource_name(args, "deployment");
                if state.deployments.contains_key(&(context.clone(), name.clone())) {
                    Ok(format!("deployment.apps/{}\n", name))
                } else if command.has_arg("--ignore-not-found") {
                    Ok(String::new())
                } else {
                    Err(Self::fail(command, format!("deployments.apps \"{}\" not found", name)))
                }
            }
            "create" => {
                let key = (context, resource_name(args, "deployment"));
                if state.deployments.contains_key(&key) {
                    return Err(Self::fail(command, "already exists"));
                }
                state.deployments.insert(key.clone(), None);
                Ok(format!("deployment.apps/{} created\n", key.1))
            }
            "label" | "scale" => {
                let key = (context, resource_name(args, "deployment"));
                if state.deployments.contains_key(&key) {
                    Ok(String::new())
                } else {
                    Err(Self::fail(command, "not found"))
                }
            }
            "annotate" => {
                let key = (context, resource_name(args, "deployment"));
                let source = args
                    .iter()
                    .find_map(|a| a.strip_prefix("kubed-sh/source="))
                    .map(String::from);
                match state.deployments.get_mut(&key) {
                    Some(slot) => {
                        *slot = source;
                        Ok(String::new())
                    }
                    None => Err(Self::fail(command, "not found")),
                }
            }
            "expose" => {
                let name = flag_value(args, "--name=").unwrap_or_else(|| resource_name(args, "deployment"));
                state.services.insert((context, name));
                Ok(String::new())
            }
            "delete" if command.has_arg("service") => {
                if state.services.remove(&(context, resource_name(args, "service"))) {
                    Ok(String::new())
                } else {
                    Err(Self::fail(command, "services not found"))
                }
            }
            "delete" => {
                if state
                    .deployments
                    .remove(&(context, resource_name(args, "deployment")))
                    .is_some()
                {
                    Ok(String::new())
                } else {
                    Err(Self::fail(command, "deployments.apps not found"))
                }
            }
            "run" => {
                let key = (context, args.first().cloned().unwrap_or_default());
                if state.pods.contains(&key) {
                    return Err(Self::fail(
                        command,
                        format!("Error from server (AlreadyExists): pods \"{}\" already exists", key.1),
                    ));
                }
                let program: Vec<&str> = args
                    .iter()
                    .skip_while(|a| *a != "--")
                    .skip(1)
                    .map(String::as_str)
                    .collect();
                if !command.has_arg("--rm") {
                    state.pods.insert(key);
                }
                Ok(format!("{} finished\n", program.join(" ")))
            }
            other => Err(Self::fail(command, format!("unknown command \"{}\"", other))),
        }
    }
}

impl Gateway for FakeCluster {
    fn run(&self, command: &ControlCommand) -> GatewayResult<String> {
        self.calls.lock().push(command.clone());

        if *self.unreachable.lock() {
            return Err(Self::fail(command, "connection refused"));
        }
        let rendered = command.to_string();
        if self.failing.lock().iter().any(|p| rendered.starts_with(p.as_str())) {
            return Err(Self::fail(command, "injected failure"));
        }
        self.handle(command)
    }
}

fn flag_value(args: &[String], prefix: &str) -> Option<String> {
    args.iter()
        .find_map(|a| a.strip_prefix(prefix))
        .map(String::from)
}

fn resource_name(args: &[String], kind: &str) -> String {
    args.iter()
        .position(|a| a == kind)
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_default()
}
