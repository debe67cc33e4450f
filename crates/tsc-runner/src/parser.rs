//! tsc output parser.
//!
//! `tsc` prints one diagnostic per locator, where a locator looks like
//! `src/app.ts(10,5):`. Everything after a locator up to the next locator
//! (or the end of output) is that diagnostic's message, which may span
//! several lines.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Error returned when `tsc` output cannot be split into diagnostics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The number of error blocks and location tokens differ, so they
    /// cannot be paired.
    #[error("malformed diagnostic output: found {blocks} error blocks but {locations} location tokens")]
    Misaligned { blocks: usize, locations: usize },

    /// A location token did not have the `path(line,column):` shape.
    #[error("malformed location token: {0}")]
    InvalidLocation(String),
}

/// Where a diagnostic points.
///
/// Line and column are kept as the text the compiler printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The file path, as printed by the compiler.
    pub path: String,
    /// 1-indexed line.
    pub line: String,
    /// 1-indexed column.
    pub column: String,
}

impl Location {
    /// Parses a `path(line,column):` token.
    ///
    /// The path may itself contain parentheses, so it ends at the last `(`.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidLocation(token.to_string());

        let (path, rest) = token.rsplit_once('(').ok_or_else(invalid)?;
        let inner = rest.strip_suffix("):").ok_or_else(invalid)?;
        let (line, column) = inner.split_once(',').ok_or_else(invalid)?;

        Ok(Self {
            path: path.to_string(),
            line: line.to_string(),
            column: column.to_string(),
        })
    }
}

/// A single diagnostic from tsc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The location the compiler reported.
    pub location: Location,
    /// The message with the location token removed.
    pub message: String,
}

fn block_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^\s]+\.(?:ts|tsx)\(\d+,\d+\):").expect("block start pattern is valid")
    })
}

fn location_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^\s]+\.(?:ts|tsx)?\(\d+,\d+\):").expect("location pattern is valid")
    })
}

/// Splits output into error blocks.
///
/// A block starts at a `.ts`/`.tsx` locator and runs up to the next locator
/// or the end of the text. A locator with no message text after it does not
/// form a block.
pub fn error_blocks(output: &str) -> Vec<&str> {
    let starts: Vec<_> = block_start_regex().find_iter(output).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(idx, m)| {
            let end = starts
                .get(idx + 1)
                .map(|next| next.start())
                .unwrap_or(output.len());
            (end > m.end()).then(|| &output[m.start()..end])
        })
        .collect()
}

/// Extracts every `path(line,column):` token, in order.
pub fn location_tokens(output: &str) -> Vec<&str> {
    location_regex()
        .find_iter(output)
        .map(|m| m.as_str())
        .collect()
}

/// Parses tsc output into diagnostics.
///
/// The Nth location token belongs to the Nth error block; if the two
/// sequences have different lengths the output is rejected.
pub fn parse_diagnostics(output: &str) -> Result<Vec<Diagnostic>, ParseError> {
    let blocks = error_blocks(output);
    let tokens = location_tokens(output);

    tracing::debug!(
        blocks = blocks.len(),
        locations = tokens.len(),
        "parsed tsc output"
    );

    if blocks.len() != tokens.len() {
        return Err(ParseError::Misaligned {
            blocks: blocks.len(),
            locations: tokens.len(),
        });
    }

    blocks
        .into_iter()
        .zip(tokens)
        .map(|(block, token)| {
            Ok(Diagnostic {
                location: Location::parse(token)?,
                message: block.replacen(token, "", 1).trim().to_string(),
            })
        })
        .collect()
}
