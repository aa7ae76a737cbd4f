use std::fmt;
use std::path::Path;

/// A one-based line/column pair, the unit `spec.md` §7 uses for all
/// user-visible locations (`PATH:LINE:COLUMN`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Formats a `PATH:LINE:COLUMN` location string, per `spec.md` §7.
pub fn format_location(path: &Path, at: LineColumn) -> String {
    format!("{}:{at}", path.display())
}

/// A source file failed to parse (`spec.md` §4.1's `ParseError`).
///
/// This is the one error kind that is never recovered locally
/// (`spec.md` §7): the file transitions straight to `Failed` and is
/// skipped, while every other file in the run proceeds.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{path}:{at}: {message}")]
pub struct ParseError {
    pub path: std::path::PathBuf,
    pub at: LineColumn,
    pub message: String,
}
