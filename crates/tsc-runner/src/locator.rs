//! Package manager executable lookup.

use camino::Utf8PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Error returned when the package manager executable cannot be located.
#[derive(Debug, Error)]
pub enum LocateError {
    /// The lookup ran but did not find the executable.
    #[error(
        "{name} is not installed or not found in PATH. Please pass the path of where {name} is installed as an argument"
    )]
    NotFound { name: String },

    /// The lookup mechanism itself could not be run.
    #[error(
        "failed to run `{command}` to locate {name}. Please pass the path of where {name} is installed as an argument"
    )]
    LookupFailed {
        name: String,
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// A way of asking the host where an executable lives.
pub trait ExecutableLookup {
    /// Returns the resolved path of `name`.
    fn lookup(&self, name: &str) -> Result<Utf8PathBuf, LocateError>;
}

/// Runs the platform lookup command (`where` on Windows, `which` elsewhere).
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLookup;

impl CommandLookup {
    /// The lookup program for the current platform.
    pub fn program() -> &'static str {
        if cfg!(windows) {
            "where"
        } else {
            "which"
        }
    }
}

impl ExecutableLookup for CommandLookup {
    fn lookup(&self, name: &str) -> Result<Utf8PathBuf, LocateError> {
        let program = Self::program();
        tracing::debug!(program, name, "looking up executable");

        let output = Command::new(program)
            .arg(name)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| LocateError::LookupFailed {
                name: name.to_string(),
                command: format!("{program} {name}"),
                source,
            })?;

        if !output.status.success() {
            return Err(LocateError::NotFound {
                name: name.to_string(),
            });
        }

        parse_lookup_output(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            LocateError::NotFound {
                name: name.to_string(),
            }
        })
    }
}

/// Searches `PATH` in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLookup;

impl ExecutableLookup for PathLookup {
    fn lookup(&self, name: &str) -> Result<Utf8PathBuf, LocateError> {
        let not_found = || LocateError::NotFound {
            name: name.to_string(),
        };
        let path = which::which(name).map_err(|_| not_found())?;
        Utf8PathBuf::try_from(path).map_err(|_| not_found())
    }
}

/// Extracts a path from lookup command output.
///
/// The output is trimmed. `where` may print one match per line, in which
/// case the first one wins.
pub fn parse_lookup_output(output: &str) -> Option<Utf8PathBuf> {
    output
        .trim()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(Utf8PathBuf::from)
}

/// Resolves the package manager executable.
///
/// An explicit path is returned verbatim without performing any lookup.
pub fn locate_executable(
    explicit: Option<Utf8PathBuf>,
    name: &str,
    lookup: &dyn ExecutableLookup,
) -> Result<Utf8PathBuf, LocateError> {
    match explicit {
        Some(path) => Ok(path),
        None => lookup.lookup(name),
    }
}
