/*!
 * Shell Module
 * Thin command layer over the orchestrator, process table and gateway
 */

pub mod commands;
pub mod local;
pub mod render;

pub use commands::{EnvAction, ShellCommand};
pub use local::WorkDir;

use crate::core::config::LaunchConfig;
use crate::core::errors::DprocError;
use crate::core::limits::CURL_POD_NAME;
use crate::env::Environments;
use crate::gateway::{ControlPlane, Gateway};
use crate::process::{DProcKind, Orchestrator};
use miette::Diagnostic;
use parking_lot::Mutex;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether the command loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell {
    gateway: Arc<dyn Gateway>,
    orchestrator: Arc<Orchestrator>,
    envs: Arc<Environments>,
    launch: LaunchConfig,
    context: Mutex<String>,
    workdir: WorkDir,
}

impl Shell {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        orchestrator: Arc<Orchestrator>,
        envs: Arc<Environments>,
        launch: LaunchConfig,
    ) -> Self {
        let context = match gateway.current_context() {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(error = %e, "Encountered issues during startup");
                String::new()
            }
        };
        Self {
            gateway,
            orchestrator,
            envs,
            launch,
            context: Mutex::new(context),
            workdir: WorkDir::new(),
        }
    }

    pub fn prompt(&self) -> String {
        let context = self.context.lock();
        if context.is_empty() {
            "[?]$ ".to_string()
        } else {
            format!("[{}]$ ", context)
        }
    }

    /// Run every line of a script, stopping at `exit`
    pub fn run_script<W: Write>(&self, script: &str, out: &mut W) -> io::Result<()> {
        for line in script.lines() {
            if self.execute(line, out)? == Flow::Exit {
                break;
            }
        }
        out.flush()
    }

    /// Prompted read-eval loop until `exit` or end of input
    pub fn run_interactive<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "\nType 'help' to learn about available built-in commands.")?;
        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            if self.execute(&line, out)? == Flow::Exit {
                break;
            }
        }
        out.flush()
    }

    pub fn execute<W: Write>(&self, line: &str, out: &mut W) -> io::Result<Flow> {
        let command = match ShellCommand::parse(line) {
            Some(command) => command,
            None => return Ok(Flow::Continue),
        };
        debug!(command = ?command, "executing");

        match command {
            ShellCommand::Exit => return Ok(Flow::Exit),
            ShellCommand::Help => writeln!(out, "{}", render::HELP)?,
            ShellCommand::Usage(message) => writeln!(out, "{}", message)?,
            ShellCommand::Ps { all } => self.ps(all, out)?,
            ShellCommand::Kill(id) => match self.orchestrator.kill(&id) {
                Ok(()) => writeln!(out, "Killed distributed process '{}'", id)?,
                Err(e) => report(out, &format!("Failed to kill {:?}", line.trim()), &e)?,
            },
            ShellCommand::Launch(line) => match self.orchestrator.launch(&line) {
                Ok(launched) if launched.kind == DProcKind::LongRunning => {
                    writeln!(out, "{}", launched.id)?
                }
                Ok(launched) => write!(out, "{}", launched.output)?,
                Err(e) => report(
                    out,
                    &format!("Failed to launch {:?} in the cluster", line),
                    &e,
                )?,
            },
            ShellCommand::Contexts => match self.gateway.describe_contexts() {
                Ok(listing) => write!(out, "{}", listing)?,
                Err(e) => report(out, "Failed to list contexts", &e.into())?,
            },
            ShellCommand::Use(target) => match self.gateway.use_context(&target) {
                Ok(res) => {
                    write!(out, "{}", res)?;
                    *self.context.lock() = target;
                }
                Err(e) => report(out, "Failed to switch contexts", &e.into())?,
            },
            ShellCommand::Env(action) => self.env(action, out)?,
            ShellCommand::Echo(word) => writeln!(out, "{}", self.envs.current().interpolate(&word))?,
            ShellCommand::Assign(name, value) => self.envs.current().set(name, value),
            ShellCommand::Literally(args) => {
                let (verb, rest) = args.split_first().map_or(("", &[][..]), |(v, r)| (v.as_str(), r));
                match self.gateway.passthrough(verb, rest) {
                    Ok(res) => write!(out, "{}", res)?,
                    Err(e) => write!(out, "{}", e.cause)?,
                }
            }
            ShellCommand::Curl(url) => {
                let command = vec!["curl".to_string(), self.envs.current().interpolate(&url)];
                match self
                    .gateway
                    .run_once(CURL_POD_NAME, &self.launch.binary_image, &command)
                {
                    Ok(res) => write!(out, "{}", res)?,
                    Err(e) => report(out, &format!("Can't curl {}", url), &e.into())?,
                }
            }
            ShellCommand::Cd(target) => {
                if let Err(e) = self.workdir.cd(target.as_deref()) {
                    writeln!(out, "cd: {}", e)?;
                }
            }
            ShellCommand::Pwd => match self.workdir.pwd() {
                Ok(dir) => writeln!(out, "{}", dir.display())?,
                Err(e) => writeln!(out, "pwd: {}", e)?,
            },
            ShellCommand::Local(program, args) => match local::run_local(&program, &args) {
                Ok(res) => write!(out, "{}", res)?,
                Err(e) => writeln!(out, "Failed to execute {} locally due to: {}", program, e)?,
            },
            ShellCommand::Sleep(duration) => std::thread::sleep(duration),
        }
        Ok(Flow::Continue)
    }

    fn env<W: Write>(&self, action: EnvAction, out: &mut W) -> io::Result<()> {
        let result = match action {
            EnvAction::Show => {
                for (k, v) in self.envs.current().snapshot() {
                    writeln!(out, "{}={}", k, v)?;
                }
                return Ok(());
            }
            EnvAction::List => {
                let current = self.envs.current_name();
                for name in self.envs.names() {
                    let marker = if name == current { "*" } else { " " };
                    writeln!(out, "{} {}", marker, name)?;
                }
                return Ok(());
            }
            EnvAction::Create(name) => self.envs.create(&name),
            EnvAction::Select(name) => self.envs.select(&name),
            EnvAction::Delete(name) => self.envs.delete(&name),
        };
        if let Err(e) = result {
            writeln!(out, "{}", e)?;
            if let Some(help) = e.help() {
                writeln!(out, "hint: {}", help)?;
            }
        }
        Ok(())
    }

    fn ps<W: Write>(&self, all: bool, out: &mut W) -> io::Result<()> {
        let context = if all {
            String::new()
        } else {
            match self.gateway.current_context() {
                Ok(ctx) => ctx,
                Err(_) => return writeln!(out, "Can't determine current context"),
            }
        };
        let entries = self.orchestrator.table().dump(&context);
        writeln!(out, "{}", render::render_dprocs(&entries, all))
    }
}

/// Print a failure with the offending target, the raw cause and a hint
fn report<W: Write>(out: &mut W, what: &str, err: &DprocError) -> io::Result<()> {
    writeln!(out, "\n{} due to:\n{}", what, err)?;
    if let Some(help) = err.help() {
        writeln!(out, "hint: {}", help)?;
    }
    writeln!(out)
}
