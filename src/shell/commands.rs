/*!
 * Shell Commands
 * Parses a command line into a built-in command or a launch
 */

use crate::env::parse_assignment;
use std::time::Duration;

/// Sub-commands of `env`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvAction {
    /// Variables of the selected environment
    Show,
    List,
    Create(String),
    Select(String),
    Delete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Exit,
    Ps { all: bool },
    Kill(String),
    Contexts,
    Use(String),
    Env(EnvAction),
    Echo(String),
    Assign(String, String),
    Literally(Vec<String>),
    Curl(String),
    /// Change the local working directory; `-` returns to the previous one
    Cd(Option<String>),
    Pwd,
    /// `ls` or `cat`, run on the local machine
    Local(String, Vec<String>),
    Sleep(Duration),
    /// Anything not recognized runs as a distributed process
    Launch(String),
    /// Built-in used without a required argument
    Usage(&'static str),
}

impl ShellCommand {
    /// None for blank lines and `#` comments
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut words = line.split_whitespace();
        let head = words.next()?;
        let first_arg = words.next().map(String::from);

        let command = match head {
            "help" => ShellCommand::Help,
            "exit" => ShellCommand::Exit,
            "ps" => ShellCommand::Ps {
                all: first_arg.as_deref() == Some("all"),
            },
            "kill" => first_arg
                .map(ShellCommand::Kill)
                .unwrap_or(ShellCommand::Usage("Need a target distributed process to kill")),
            "contexts" => ShellCommand::Contexts,
            "use" => first_arg
                .map(ShellCommand::Use)
                .unwrap_or(ShellCommand::Usage("Need a target cluster context")),
            "env" => parse_env(first_arg, words.next()),
            "cd" => ShellCommand::Cd(first_arg),
            "pwd" => ShellCommand::Pwd,
            "ls" | "cat" => ShellCommand::Local(
                head.to_string(),
                first_arg.into_iter().chain(words.map(String::from)).collect(),
            ),
            "sleep" => match first_arg.as_deref().map(str::parse::<f64>) {
                Some(Ok(secs)) if secs.is_finite() && secs >= 0.0 => {
                    ShellCommand::Sleep(Duration::from_secs_f64(secs))
                }
                _ => ShellCommand::Usage("Need a number of seconds to sleep"),
            },
            "echo" => first_arg
                .map(ShellCommand::Echo)
                .unwrap_or(ShellCommand::Usage("No value to echo given")),
            "literally" => match first_arg {
                Some(verb) => ShellCommand::Literally(
                    std::iter::once(verb).chain(words.map(String::from)).collect(),
                ),
                None => ShellCommand::Usage("Not enough input for a valid kubectl command"),
            },
            "curl" => first_arg.map(ShellCommand::Curl).unwrap_or(ShellCommand::Usage(
                "Need a target URL, for example `curl someservice` in the cluster or `curl http://example.com`",
            )),
            _ => match parse_assignment(line) {
                Some((name, value)) => ShellCommand::Assign(name, value),
                None => ShellCommand::Launch(line.to_string()),
            },
        };
        Some(command)
    }
}

fn parse_env(action: Option<String>, name: Option<&str>) -> ShellCommand {
    let named = |build: fn(String) -> EnvAction| match name {
        Some(name) => ShellCommand::Env(build(name.to_string())),
        None => ShellCommand::Usage("Need the name of an environment"),
    };
    match action.as_deref() {
        None => ShellCommand::Env(EnvAction::Show),
        Some("list") => ShellCommand::Env(EnvAction::List),
        Some("create") => named(EnvAction::Create),
        Some("select") => named(EnvAction::Select),
        Some("delete") => named(EnvAction::Delete),
        Some(_) => ShellCommand::Usage("Use env with one of: list, create, select, delete"),
    }
}
