/*!
 * Local Built-ins
 * Commands that act on the machine running the shell rather than the cluster
 */

use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Run a local program and capture its standard output.
/// A non-zero exit is an error carrying the program's stderr.
pub fn run_local(program: &str, args: &[String]) -> io::Result<String> {
    let output = Command::new(program).args(args).output()?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let cause = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        Err(io::Error::new(io::ErrorKind::Other, cause))
    }
}

/// Process working directory plus the one before the last `cd`
#[derive(Debug)]
pub struct WorkDir {
    previous: Mutex<PathBuf>,
}

impl WorkDir {
    pub fn new() -> Self {
        let here = std::env::current_dir().unwrap_or_default();
        Self {
            previous: Mutex::new(here),
        }
    }

    /// `None` goes home, `-` goes back to the previous directory.
    /// Returns the new working directory.
    pub fn cd(&self, target: Option<&str>) -> io::Result<PathBuf> {
        let mut previous = self.previous.lock();
        let destination = match target {
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))?,
            Some("-") => previous.clone(),
            Some(path) => PathBuf::from(path),
        };

        let here = std::env::current_dir()?;
        std::env::set_current_dir(&destination)?;
        *previous = here;
        std::env::current_dir()
    }

    pub fn pwd(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}

impl Default for WorkDir {
    fn default() -> Self {
        Self::new()
    }
}
