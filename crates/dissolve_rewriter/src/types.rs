use std::path::PathBuf;

use ruff_text_size::TextRange;

/// Why a candidate call site was bound successfully or not (`spec.md` §4.4,
/// "Argument binding").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("expected {expected} argument(s), got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("keyword argument `{0}` does not match any parameter")]
    UnknownKeyword(String),
    #[error("positional argument targets keyword-only parameter `{0}`")]
    PositionalToKeywordOnly(String),
    #[error("variadic argument used but template references individual elements")]
    VariadicTemplateMismatch,
    #[error("receiver used more than once with side effects in the template")]
    ReceiverReusedWithSideEffects,
    #[error("receiver's declaring class could not be resolved")]
    UnknownReceiverType,
}

/// One applied replacement (`spec.md` §4.4 "Output"): the record the
/// Driver prints in `--check`/diff output and uses for interactive
/// prompting.
#[derive(Debug, Clone)]
pub struct AppliedReplacement {
    pub line: usize,
    pub column: usize,
    pub old_text: String,
    pub new_text: String,
    pub qualified_name: String,
    pub range: TextRange,
}

/// A candidate site the Rewriter saw but declined to rewrite, with the
/// reason, so the Driver can report it as a warning (`spec.md` §7:
/// "`BindingError`... Warning; site skipped").
#[derive(Debug, Clone)]
pub struct SkippedSite {
    pub line: usize,
    pub column: usize,
    pub qualified_name: Option<String>,
    pub reason: String,
}

/// Per-file lifecycle for `migrate` mode (`spec.md` §4.4: "State machine
/// per file").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Unread,
    Parsed,
    Collected,
    Rewritten(usize),
    Reprinted,
    Written,
    Previewed,
    Unchanged,
    Failed,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RewriteError {
    #[error("{path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: String },
}
