/*!
 * Process Types
 * Data model of tracked distributed processes
 */

use crate::core::errors::{DprocError, DprocResult};
use crate::core::limits::MAX_DPROC_ID_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How a distributed process is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DProcKind {
    /// Backed by a persistent workload, tracked in the table
    LongRunning,
    /// Fire-and-forget, never tracked
    Ephemeral,
}

impl fmt::Display for DProcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DProcKind::LongRunning => f.write_str("long-running"),
            DProcKind::Ephemeral => f.write_str("ephemeral"),
        }
    }
}

/// Script interpreters understood by the launcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpreter {
    Python,
    Node,
    Ruby,
}

impl Interpreter {
    pub const ALL: [Interpreter; 3] = [Interpreter::Python, Interpreter::Node, Interpreter::Ruby];

    /// Command used to run a script inside the container
    pub fn command(&self) -> &'static str {
        match self {
            Interpreter::Python => "python",
            Interpreter::Node => "node",
            Interpreter::Ruby => "ruby",
        }
    }

    pub fn from_command(command: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.command() == command)
    }

    pub fn from_extension(path: &str) -> Option<Self> {
        match Path::new(path).extension()?.to_str()? {
            "py" => Some(Interpreter::Python),
            "js" => Some(Interpreter::Node),
            "rb" => Some(Interpreter::Ruby),
            _ => None,
        }
    }
}

/// Provenance of a distributed process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    Binary { path: String },
    Script { interpreter: Interpreter, path: String },
}

impl Source {
    pub fn binary(path: impl Into<String>) -> Self {
        Source::Binary { path: path.into() }
    }

    pub fn script(interpreter: Interpreter, path: impl Into<String>) -> Self {
        Source::Script {
            interpreter,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Source::Binary { path } | Source::Script { path, .. } => path,
        }
    }

    pub fn interpreter(&self) -> Option<Interpreter> {
        match self {
            Source::Binary { .. } => None,
            Source::Script { interpreter, .. } => Some(*interpreter),
        }
    }

    /// Name of the network endpoint fronting this process
    pub fn endpoint_name(&self) -> DprocResult<String> {
        name_from_path(self.path())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Binary { path } => write!(f, "bin:{}", path),
            Source::Script { interpreter, path } => {
                write!(f, "script:{}:{}", interpreter.command(), path)
            }
        }
    }
}

impl FromStr for Source {
    type Err = DprocError;

    /// Parses the annotation form written at launch time.
    /// `script:<path>` without an interpreter falls back to the file extension.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || DprocError::UnknownSource(s.to_string());
        let (tag, rest) = s.split_once(':').ok_or_else(unknown)?;
        if rest.is_empty() {
            return Err(unknown());
        }
        match tag {
            "bin" => Ok(Source::binary(rest)),
            "script" => match rest.split_once(':') {
                Some((interp, path)) if !path.is_empty() => Interpreter::from_command(interp)
                    .map(|i| Source::script(i, path))
                    .ok_or_else(unknown),
                _ => Interpreter::from_extension(rest)
                    .map(|i| Source::script(i, rest))
                    .ok_or_else(unknown),
            },
            _ => Err(unknown()),
        }
    }
}

/// Composite identity of a distributed process
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DProcKey {
    pub id: String,
    pub context: String,
}

impl DProcKey {
    pub fn new(id: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context: context.into(),
        }
    }
}

/// A tracked distributed process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DProc {
    pub id: String,
    pub kind: DProcKind,
    pub context: String,
    pub source: Source,
}

impl DProc {
    pub fn new(
        id: impl Into<String>,
        kind: DProcKind,
        context: impl Into<String>,
        source: Source,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            context: context.into(),
            source,
        }
    }

    pub fn key(&self) -> DProcKey {
        DProcKey::new(self.id.clone(), self.context.clone())
    }
}

/// Transient phase of a process that is mid-transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Launching,
    Killing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Launching => f.write_str("launching"),
            Phase::Killing => f.write_str("killing"),
        }
    }
}

/// Derive a workload name from a program path: file stem, lowercased,
/// with `_` and `.` mapped to `-`. Must be a valid DNS-1123 label.
pub fn name_from_path(path: &str) -> DprocResult<String> {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DprocError::InvalidInvocation(format!("no program name in '{}'", path)))?;

    let name: String = stem
        .chars()
        .map(|c| match c {
            '_' | '.' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect();

    let valid = !name.is_empty()
        && name.len() <= MAX_DPROC_ID_LEN
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-');

    if valid {
        Ok(name)
    } else {
        Err(DprocError::InvalidInvocation(format!(
            "'{}' does not yield a valid process name",
            path
        )))
    }
}
