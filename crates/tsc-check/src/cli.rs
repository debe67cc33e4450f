//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Runs `tsc --noEmit` through pnpm and prints a readable report.
#[derive(Debug, Parser)]
#[command(name = "tsc-check")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the package manager executable (looked up when omitted)
    #[arg(value_name = "PNPM_PATH")]
    pub pnpm_path: Option<Utf8PathBuf>,

    /// Package manager to look up when no path is given
    #[arg(long = "package-manager")]
    pub package_manager: Option<String>,

    /// Compiler subcommand run through the package manager
    #[arg(long)]
    pub compiler: Option<String>,

    /// Project file passed to `--project`
    #[arg(long)]
    pub project: Option<Utf8PathBuf>,

    /// How to look up the package manager
    #[arg(long, value_enum)]
    pub lookup: Option<LookupStrategy>,

    /// Exit with code 1 when the compiler reports errors
    #[arg(long = "fail-on-errors")]
    pub fail_on_errors: bool,

    /// Do not show the progress indicator
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// When to use colors
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorChoice,

    /// Print debug logs to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Package manager lookup strategy.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStrategy {
    /// Ask the OS lookup command (`which`/`where`)
    #[default]
    Command,
    /// Search PATH directly
    Path,
}

/// Color mode.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color when writing to a terminal and NO_COLOR is unset (default)
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}
