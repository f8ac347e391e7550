/*!
 * Gateway Types
 * Control-plane command description
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// One control-plane CLI invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ControlCommand {
    /// Pinned to the configured namespace
    pub scoped: bool,
    pub verb: String,
    pub args: Vec<String>,
}

impl ControlCommand {
    /// Command that runs inside the configured namespace
    pub fn scoped(verb: impl Into<String>) -> Self {
        Self {
            scoped: true,
            verb: verb.into(),
            args: vec![],
        }
    }

    /// Command that is not namespace-bound (context management, discovery)
    pub fn global(verb: impl Into<String>) -> Self {
        Self {
            scoped: false,
            verb: verb.into(),
            args: vec![],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// True if the positional arguments contain `word`
    pub fn has_arg(&self, word: &str) -> bool {
        self.args.iter().any(|a| a == word)
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verb)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
