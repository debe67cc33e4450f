//! Main orchestration logic.
//!
//! A run goes through locating the package manager, starting the progress
//! indicator, invoking the compiler, stopping the indicator and rendering
//! the report. No step is retried.

use crate::cli::{Args, LookupStrategy};
use crate::config::{FileConfig, Settings};
use crate::output::{Palette, Report};
use crate::progress::ProgressIndicator;
use crate::terminal::AnsiTerminal;
use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;
use tsc_runner::{
    locate_executable, CommandLookup, ExecutableLookup, LocateError, ParseError, PathLookup,
    TscError, TscRunner,
};

/// Fatal errors. Each one ends the process with exit code 1.
#[derive(Debug, Error, Diagnostic)]
pub enum CheckError {
    /// The package manager could not be located.
    #[error("Dependency Not Found: {0}")]
    #[diagnostic(
        code(tsc_check::dependency_not_found),
        help("pass the package manager path as the first argument, e.g. `tsc-check ~/.local/share/pnpm/pnpm`")
    )]
    DependencyNotFound(LocateError),

    /// The project file is missing.
    #[error("{0}")]
    #[diagnostic(
        code(tsc_check::project_not_found),
        help("create the project file or point to another one with --project")
    )]
    ProjectNotFound(TscError),

    /// Compiler output could not be split into diagnostics.
    #[error("{0}")]
    #[diagnostic(code(tsc_check::malformed_output))]
    MalformedOutput(ParseError),

    /// The working directory is not usable.
    #[error("cannot use the current directory: {0}")]
    #[diagnostic(code(tsc_check::working_dir))]
    WorkingDir(String),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSummary {
    /// A report was printed.
    Reported {
        /// Whether the report was a success.
        success: bool,
        /// Whether a failed report should fail the process.
        fail_on_errors: bool,
    },
    /// The user interrupted the run.
    Interrupted,
}

impl RunSummary {
    /// The process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Reported {
                success: false,
                fail_on_errors: true,
            } => 1,
            Self::Reported { .. } => 0,
            Self::Interrupted => 130,
        }
    }
}

/// Resolves when the user presses Ctrl+C.
///
/// Never resolves if the signal handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for interrupts: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Runs one check.
pub async fn run(args: Args) -> Result<RunSummary, CheckError> {
    let workspace = std::env::current_dir()
        .map_err(|e| CheckError::WorkingDir(e.to_string()))
        .and_then(|p| {
            Utf8PathBuf::try_from(p).map_err(|e| CheckError::WorkingDir(e.to_string()))
        })?;

    let settings = Settings::resolve(&args, FileConfig::load(&workspace));
    tracing::debug!(?settings, "resolved settings");
    let palette = Palette::new(settings.color);

    let lookup: Box<dyn ExecutableLookup> = match settings.lookup {
        LookupStrategy::Command => Box::new(CommandLookup),
        LookupStrategy::Path => Box::new(PathLookup),
    };
    let executable = locate_executable(
        settings.package_manager_path.clone(),
        &settings.package_manager,
        lookup.as_ref(),
    )
    .map_err(CheckError::DependencyNotFound)?;
    tracing::debug!(executable = %executable, "resolved package manager");

    let runner = TscRunner::new(
        executable,
        settings.compiler.clone(),
        settings.project.clone(),
        workspace,
    );
    runner.resolve_project().map_err(CheckError::ProjectNotFound)?;

    let indicator = settings
        .progress
        .then(|| ProgressIndicator::start(AnsiTerminal::stdout(), palette));

    let output = tokio::select! {
        output = runner.check() => output,
        _ = interrupted() => {
            tracing::debug!("interrupted, killing compiler");
            if let Some(indicator) = indicator {
                indicator.interrupt().await;
            }
            return Ok(RunSummary::Interrupted);
        }
    };

    if let Some(indicator) = indicator {
        indicator.stop().await;
    }

    let report = Report::from_output(output).map_err(CheckError::MalformedOutput)?;
    let rendered = report.render(palette);
    if report.is_success() {
        print!("{}", rendered);
    } else {
        eprint!("{}", rendered);
    }

    Ok(RunSummary::Reported {
        success: report.is_success(),
        fail_on_errors: settings.fail_on_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let ok = RunSummary::Reported {
            success: true,
            fail_on_errors: true,
        };
        let informational = RunSummary::Reported {
            success: false,
            fail_on_errors: false,
        };
        let gated = RunSummary::Reported {
            success: false,
            fail_on_errors: true,
        };
        assert_eq!(ok.exit_code(), 0);
        assert_eq!(informational.exit_code(), 0);
        assert_eq!(gated.exit_code(), 1);
        assert_eq!(RunSummary::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_dependency_error_message() {
        let err = CheckError::DependencyNotFound(LocateError::NotFound {
            name: "pnpm".to_string(),
        });
        let message = err.to_string();
        assert!(message.starts_with("Dependency Not Found: pnpm is not installed"));
        assert!(message.contains("Please pass the path of where pnpm is installed"));
    }
}
