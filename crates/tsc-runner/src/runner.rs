//! tsc process runner.

use camino::{Utf8Path, Utf8PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Default project file passed to `--project`.
pub const DEFAULT_PROJECT: &str = "tsconfig.check.json";

/// Default compiler subcommand run through the package manager.
pub const DEFAULT_COMPILER: &str = "tsc";

/// Error types for tsc runner.
#[derive(Debug, Error)]
pub enum TscError {
    /// The project file does not exist.
    #[error("project file not found at: {0}")]
    ProjectNotFound(Utf8PathBuf),
}

/// Why an invocation counts as failed.
#[derive(Debug, Error)]
pub enum InvocationFailure {
    /// The process could not be started.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero code.
    #[error("command failed with exit code {0}")]
    ExitCode(i32),

    /// The process was terminated without an exit code.
    #[error("command was terminated by a signal")]
    Signal,
}

impl InvocationFailure {
    fn from_status(status: ExitStatus) -> Option<Self> {
        if status.success() {
            return None;
        }
        Some(match status.code() {
            Some(code) => Self::ExitCode(code),
            None => Self::Signal,
        })
    }
}

/// Captured result of one compiler run.
#[derive(Debug, Default)]
pub struct TscOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Set when the process could not run or did not exit cleanly.
    pub failure: Option<InvocationFailure>,
}

/// The tsc runner.
#[derive(Debug, Clone)]
pub struct TscRunner {
    /// Path to the package manager executable.
    executable: Utf8PathBuf,
    /// Compiler subcommand, usually `tsc`.
    compiler: String,
    /// Project file, relative to `working_dir`.
    project: Utf8PathBuf,
    /// Directory the compiler runs in.
    working_dir: Utf8PathBuf,
}

impl TscRunner {
    /// Creates a new tsc runner.
    pub fn new(
        executable: Utf8PathBuf,
        compiler: impl Into<String>,
        project: Utf8PathBuf,
        working_dir: Utf8PathBuf,
    ) -> Self {
        Self {
            executable,
            compiler: compiler.into(),
            project,
            working_dir,
        }
    }

    /// The package manager executable this runner invokes.
    pub fn executable(&self) -> &Utf8Path {
        &self.executable
    }

    /// Arguments passed to the package manager.
    pub fn args(&self) -> Vec<String> {
        vec![
            self.compiler.clone(),
            "--noEmit".to_string(),
            "--project".to_string(),
            self.project.to_string(),
        ]
    }

    /// The full command line, for display.
    pub fn command_line(&self) -> String {
        let mut line = self.executable.to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// Verifies the project file exists in the working directory.
    pub fn resolve_project(&self) -> Result<Utf8PathBuf, TscError> {
        let candidate = self.working_dir.join(&self.project);
        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(TscError::ProjectNotFound(candidate))
        }
    }

    /// Runs the compiler in check-only mode and captures its output.
    ///
    /// A spawn failure is reported through [`TscOutput::failure`] rather
    /// than as an error, so the caller renders it like any other failed run.
    /// The child is killed if the returned future is dropped.
    pub async fn check(&self) -> TscOutput {
        tracing::debug!(command = %self.command_line(), cwd = %self.working_dir, "running compiler");

        let output = Command::new(&self.executable)
            .args(self.args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(source) => {
                return TscOutput {
                    failure: Some(InvocationFailure::Spawn {
                        command: self.command_line(),
                        source,
                    }),
                    ..TscOutput::default()
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::debug!(
            status = %output.status,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "compiler finished"
        );

        TscOutput {
            stdout,
            stderr,
            failure: InvocationFailure::from_status(output.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn runner(executable: &str, dir: &Utf8Path) -> TscRunner {
        TscRunner::new(
            Utf8PathBuf::from(executable),
            DEFAULT_COMPILER,
            Utf8PathBuf::from(DEFAULT_PROJECT),
            dir.to_owned(),
        )
    }

    #[test]
    fn test_args() {
        let runner = runner("/usr/bin/pnpm", Utf8Path::new("."));
        assert_eq!(
            runner.args(),
            vec!["tsc", "--noEmit", "--project", "tsconfig.check.json"]
        );
        assert_eq!(
            runner.command_line(),
            "/usr/bin/pnpm tsc --noEmit --project tsconfig.check.json"
        );
    }

    #[test]
    fn test_resolve_project() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let runner = runner("pnpm", &dir);

        assert!(matches!(
            runner.resolve_project(),
            Err(TscError::ProjectNotFound(_))
        ));

        std::fs::write(dir.join(DEFAULT_PROJECT), "{}").unwrap();
        assert_eq!(
            runner.resolve_project().unwrap(),
            dir.join("tsconfig.check.json")
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let output = runner("/nonexistent/tsc-check/pnpm", &dir).check().await;

        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
        assert!(matches!(
            output.failure,
            Some(InvocationFailure::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_output_and_exit_code() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let script = dir.join("fake-pm");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"args: $*\"\necho warn >&2\nexit 2\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output = runner(script.as_str(), &dir).check().await;
        assert_eq!(
            output.stdout,
            "args: tsc --noEmit --project tsconfig.check.json\n"
        );
        assert_eq!(output.stderr, "warn\n");
        assert!(matches!(output.failure, Some(InvocationFailure::ExitCode(2))));
    }
}
