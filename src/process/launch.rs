/*!
 * Launch Classification
 * Turns a command line into a typed invocation
 */

use super::types::{name_from_path, DProcKind, Interpreter, Source};
use crate::core::errors::{DprocError, DprocResult};
use serde::{Deserialize, Serialize};

/// A parsed launch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invocation {
    pub interpreter: Option<Interpreter>,
    pub program: String,
    pub args: Vec<String>,
    /// Trailing `&`: keep running and track in the table
    pub background: bool,
}

impl Invocation {
    pub fn parse(line: &str) -> DprocResult<Self> {
        let mut rest = line.trim();
        let background = match rest.strip_suffix('&') {
            Some(stripped) => {
                rest = stripped.trim_end();
                true
            }
            None => false,
        };
        if rest.ends_with('&') {
            return Err(DprocError::InvalidInvocation(format!(
                "only one trailing '&' is allowed in '{}'",
                line.trim()
            )));
        }

        let mut tokens = rest.split_whitespace();
        let first = tokens
            .next()
            .ok_or_else(|| DprocError::InvalidInvocation("nothing to launch".to_string()))?;

        let (interpreter, program) = match Interpreter::from_command(first) {
            Some(interpreter) => {
                let script = tokens.next().ok_or_else(|| {
                    DprocError::InvalidInvocation(format!("{} needs a script to run", first))
                })?;
                (Some(interpreter), script)
            }
            None => (None, first),
        };

        Ok(Self {
            interpreter,
            program: program.to_string(),
            args: tokens.map(String::from).collect(),
            background,
        })
    }

    /// Identifier of the resulting distributed process
    pub fn id(&self) -> DprocResult<String> {
        name_from_path(&self.program)
    }

    pub fn kind(&self) -> DProcKind {
        if self.background {
            DProcKind::LongRunning
        } else {
            DProcKind::Ephemeral
        }
    }

    pub fn source(&self) -> Source {
        match self.interpreter {
            Some(interpreter) => Source::script(interpreter, self.program.clone()),
            None => Source::binary(self.program.clone()),
        }
    }

    /// Command executed inside the workload's container
    pub fn container_command(&self) -> Vec<String> {
        let mut command = Vec::with_capacity(self.args.len() + 2);
        if let Some(interpreter) = self.interpreter {
            command.push(interpreter.command().to_string());
        }
        command.push(self.program.clone());
        command.extend(self.args.iter().cloned());
        command
    }
}
