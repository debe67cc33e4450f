//! TypeScript compiler runner.
//!
//! This crate locates a package manager, runs `tsc --noEmit` through it and
//! splits the compiler's textual output into diagnostics.
//!
//! # Example
//!
//! ```ignore
//! use tsc_runner::{locate_executable, parse_diagnostics, CommandLookup, TscRunner};
//! use camino::Utf8PathBuf;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pnpm = locate_executable(None, "pnpm", &CommandLookup).unwrap();
//!     let runner = TscRunner::new(
//!         pnpm,
//!         "tsc",
//!         Utf8PathBuf::from("tsconfig.check.json"),
//!         Utf8PathBuf::from("."),
//!     );
//!
//!     let output = runner.check().await;
//!     for diag in parse_diagnostics(&output.stdout).unwrap() {
//!         println!("{}:{}:{} {}", diag.location.path, diag.location.line, diag.location.column, diag.message);
//!     }
//! }
//! ```

mod locator;
mod parser;
mod runner;

pub use locator::{
    locate_executable, parse_lookup_output, CommandLookup, ExecutableLookup, LocateError,
    PathLookup,
};
pub use parser::{error_blocks, location_tokens, parse_diagnostics, Diagnostic, Location, ParseError};
pub use runner::{
    InvocationFailure, TscError, TscOutput, TscRunner, DEFAULT_COMPILER, DEFAULT_PROJECT,
};
