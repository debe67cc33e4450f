//! Report rendering.

use nu_ansi_term::{Color, Style};
use tsc_runner::{parse_diagnostics, Diagnostic, InvocationFailure, ParseError, TscOutput};

const SUCCESS_MESSAGE: &str =
    "✔️ ✔️  TypeScript validation-checking completed successfully. Happy shipping 🤗";

/// Optional coloring for terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A palette that never emits escape codes.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(self, style: Style, text: &str) -> String {
        if self.enabled {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bright blue, used for the progress label and glyph.
    pub fn accent(self, text: &str) -> String {
        self.paint(Color::LightBlue.normal(), text)
    }
}

/// Outcome of a compiler run, ready to print.
#[derive(Debug)]
pub enum Report {
    /// The compiler ran cleanly.
    Success,
    /// The compiler exited cleanly but wrote to stderr.
    CompilerStderr(String),
    /// The compiler could not run or exited with an error.
    Failed {
        diagnostics: Vec<Diagnostic>,
        stderr: String,
        /// Raw stdout, shown when no diagnostics could be extracted from it.
        stdout: String,
        /// Set when the process could not be spawned at all.
        spawn_error: Option<String>,
    },
}

impl Report {
    /// Classifies captured compiler output.
    ///
    /// Stdout is only parsed for failed invocations.
    pub fn from_output(output: TscOutput) -> Result<Self, ParseError> {
        let TscOutput {
            stdout,
            stderr,
            failure,
        } = output;

        if let Some(failure) = failure {
            let diagnostics = parse_diagnostics(&stdout)?;
            let spawn_error = match failure {
                InvocationFailure::Spawn { .. } => Some(failure.to_string()),
                InvocationFailure::ExitCode(_) | InvocationFailure::Signal => None,
            };
            return Ok(Self::Failed {
                diagnostics,
                stderr,
                stdout,
                spawn_error,
            });
        }

        if !stderr.is_empty() {
            return Ok(Self::CompilerStderr(stderr));
        }

        Ok(Self::Success)
    }

    /// Returns whether the run found nothing to report.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Renders the report, ending in a newline. Everything but a success
    /// belongs on stderr.
    pub fn render(&self, palette: Palette) -> String {
        match self {
            Self::Success => palette.paint(Color::Green.normal(), SUCCESS_MESSAGE) + "\n",
            Self::CompilerStderr(stderr) => format!(
                "{}\n{}\n",
                palette.paint(Color::Blue.bold(), "TypeScript errors:"),
                palette.paint(Color::Red.bold(), stderr.trim_end())
            ),
            Self::Failed {
                diagnostics,
                stderr,
                stdout,
                spawn_error,
            } => render_failure(diagnostics, stderr, stdout, spawn_error.as_deref(), palette),
        }
    }
}

fn render_failure(
    diagnostics: &[Diagnostic],
    stderr: &str,
    stdout: &str,
    spawn_error: Option<&str>,
    palette: Palette,
) -> String {
    let count = diagnostics.len();
    let error_word = if count > 1 { "Errors" } else { "Error" };
    let header = Style::new().on(Color::LightBlue).bold();

    let mut output = format!(
        "💢 {} {}\n\n",
        palette.paint(Color::LightBlue.bold(), "TS Validity Failed:"),
        palette.paint(
            Color::LightYellow.bold(),
            &format!("Found {} {}", count, error_word)
        )
    );

    if let Some(message) = spawn_error {
        output.push_str(&palette.paint(Color::LightRed.bold(), message));
        output.push_str("\n\n");
    }

    if !stderr.is_empty() {
        output.push_str(&format!(
            "{} {}\n\n",
            palette.paint(header, "stderr:"),
            palette.paint(Color::LightRed.bold(), stderr.trim_end())
        ));
    }

    if !diagnostics.is_empty() {
        output.push_str(&palette.paint(header, "stdout:"));
        output.push('\n');
        for diag in diagnostics {
            let loc = &diag.location;
            output.push_str(&format!(
                "{}{}\n{}\n\n",
                palette.paint(Color::LightGreen.bold(), &loc.path),
                palette.paint(
                    Color::LightYellow.normal(),
                    &format!(" Line: {} Column: {} ", loc.line, loc.column)
                ),
                palette.paint(Color::LightRed.normal(), &diag.message)
            ));
        }
    } else if !stdout.trim().is_empty() {
        output.push_str(&palette.paint(header, "stdout:"));
        output.push('\n');
        output.push_str(stdout.trim_end());
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn failed_output(stdout: &str, stderr: &str) -> TscOutput {
        TscOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            failure: Some(InvocationFailure::ExitCode(2)),
        }
    }

    #[test]
    fn test_success() {
        let report = Report::from_output(TscOutput::default()).unwrap();
        assert!(report.is_success());
        assert_eq!(
            report.render(Palette::plain()),
            "✔️ ✔️  TypeScript validation-checking completed successfully. Happy shipping 🤗\n"
        );
    }

    #[test]
    fn test_success_ignores_unmatched_stdout() {
        let output = TscOutput {
            stdout: "src/a.ts(1,1): error TS1: ignored\n".to_string(),
            ..TscOutput::default()
        };
        assert!(Report::from_output(output).unwrap().is_success());
    }

    #[test]
    fn test_stderr_without_failure_skips_stdout() {
        let output = TscOutput {
            stdout: "src/a.ts(1,1): error TS1: not printed\n".to_string(),
            stderr: "warning: deprecated option\n".to_string(),
            failure: None,
        };
        let report = Report::from_output(output).unwrap();
        assert!(!report.is_success());

        let rendered = report.render(Palette::plain());
        assert_eq!(rendered, "TypeScript errors:\nwarning: deprecated option\n");
        assert!(!rendered.contains("not printed"));
    }

    #[test]
    fn test_failure_lists_each_diagnostic() {
        let stdout = "\
src/a.ts(3,5): error TS2322: Type 'string' is not assignable to type 'number'.
foo.ts(10,2): Type error
";
        let report = Report::from_output(failed_output(stdout, "")).unwrap();
        assert_eq!(
            report.render(Palette::plain()),
            concat!(
                "💢 TS Validity Failed: Found 2 Errors\n\n",
                "stdout:\n",
                "src/a.ts Line: 3 Column: 5 \n",
                "error TS2322: Type 'string' is not assignable to type 'number'.\n\n",
                "foo.ts Line: 10 Column: 2 \n",
                "Type error\n\n",
            )
        );
    }

    #[test]
    fn test_failure_with_stderr_and_single_error() {
        let report =
            Report::from_output(failed_output("lib/x.tsx(1,9): oops\n", "ELIFECYCLE\n")).unwrap();
        let rendered = report.render(Palette::plain());
        assert!(rendered.starts_with("💢 TS Validity Failed: Found 1 Error\n\n"));
        assert!(rendered.contains("stderr: ELIFECYCLE\n\n"));
        assert!(rendered.contains("lib/x.tsx Line: 1 Column: 9 \noops\n"));
    }

    #[test]
    fn test_failure_without_diagnostics_echoes_stdout() {
        let report =
            Report::from_output(failed_output("Version 5.6.3\nUnknown option\n", "")).unwrap();
        let rendered = report.render(Palette::plain());
        assert!(rendered.contains("Found 0 Error"));
        assert!(rendered.contains("stdout:\nVersion 5.6.3\nUnknown option\n"));
    }

    #[test]
    fn test_spawn_failure_is_shown() {
        let output = TscOutput {
            failure: Some(InvocationFailure::Spawn {
                command: "/missing/pnpm tsc".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
            ..TscOutput::default()
        };
        let rendered = Report::from_output(output)
            .unwrap()
            .render(Palette::plain());
        assert!(rendered.contains("failed to spawn `/missing/pnpm tsc`"));
    }

    #[test]
    fn test_misaligned_output_is_an_error() {
        let result = Report::from_output(failed_output(
            "src/a.ts(1,1): error one\nMakefile.(2,2): error two\n",
            "",
        ));
        assert!(matches!(result, Err(ParseError::Misaligned { .. })));
    }

    #[test]
    fn test_colored_output_contains_escapes() {
        let rendered = Report::Success.render(Palette::new(true));
        assert!(rendered.contains("\x1b["));
        assert!(rendered.contains(SUCCESS_MESSAGE));
    }
}
