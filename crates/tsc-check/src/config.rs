//! Configuration loading.

use crate::cli::{Args, ColorChoice, LookupStrategy};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;
use std::io::IsTerminal;
use tsc_runner::{DEFAULT_COMPILER, DEFAULT_PROJECT};

/// Name of the optional configuration file in the working directory.
pub const CONFIG_FILE: &str = "tsc-check.json";

/// Package manager looked up when none is configured.
pub const DEFAULT_PACKAGE_MANAGER: &str = "pnpm";

/// Contents of `tsc-check.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub package_manager_path: Option<Utf8PathBuf>,
    pub package_manager: Option<String>,
    pub compiler: Option<String>,
    pub project: Option<Utf8PathBuf>,
    pub lookup: Option<LookupStrategy>,
    pub fail_on_errors: Option<bool>,
    pub progress: Option<bool>,
}

impl FileConfig {
    /// Loads `tsc-check.json` from the project root.
    ///
    /// A missing file yields the defaults. An unreadable or invalid file is
    /// reported as a warning and ignored.
    pub fn load(project_root: &Utf8Path) -> Self {
        let config_path = project_root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }

        match Self::parse_config(&config_path) {
            Ok(config) => {
                tracing::debug!(path = %config_path, "loaded configuration");
                config
            }
            Err(e) => {
                tracing::warn!("failed to parse {}: {}", config_path, e);
                Self::default()
            }
        }
    }

    fn parse_config(path: &Utf8Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Explicit package manager path; `None` means look it up.
    pub package_manager_path: Option<Utf8PathBuf>,
    pub package_manager: String,
    pub compiler: String,
    pub project: Utf8PathBuf,
    pub lookup: LookupStrategy,
    pub fail_on_errors: bool,
    pub progress: bool,
    pub color: bool,
}

impl Settings {
    /// Merges CLI arguments over the file configuration over defaults.
    pub fn resolve(args: &Args, file: FileConfig) -> Self {
        let stdout_is_tty = std::io::stdout().is_terminal();
        let stderr_is_tty = std::io::stderr().is_terminal();

        let package_manager_path = args
            .pnpm_path
            .clone()
            .or(file.package_manager_path)
            .map(|path| expand_tilde(&path));

        let color = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && stdout_is_tty && stderr_is_tty
            }
        };

        Self {
            package_manager_path,
            package_manager: args
                .package_manager
                .clone()
                .or(file.package_manager)
                .unwrap_or_else(|| DEFAULT_PACKAGE_MANAGER.to_string()),
            compiler: args
                .compiler
                .clone()
                .or(file.compiler)
                .unwrap_or_else(|| DEFAULT_COMPILER.to_string()),
            project: args
                .project
                .clone()
                .or(file.project)
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_PROJECT)),
            lookup: args.lookup.or(file.lookup).unwrap_or_default(),
            fail_on_errors: args.fail_on_errors || file.fail_on_errors.unwrap_or(false),
            progress: !args.no_progress && file.progress.unwrap_or(true) && stdout_is_tty,
            color,
        }
    }
}

/// Expands a leading `~` in a user-supplied path.
fn expand_tilde(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(shellexpand::tilde(path.as_str()).as_ref())
}
