use std::path::PathBuf;

use ruff_text_size::TextSize;

/// The outcome of a single `resolve_receiver_type` query (`spec.md` §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Known(String),
    Unknown,
}

impl ResolvedType {
    pub fn as_known(&self) -> Option<&str> {
        match self {
            Self::Known(name) => Some(name),
            Self::Unknown => None,
        }
    }
}

/// One `resolve_receiver_type` query, as described in `spec.md` §4.3:
/// "given a source file, line, column, and a receiver expression".
#[derive(Debug, Clone)]
pub struct TypeQuery {
    pub file: PathBuf,
    pub offset: TextSize,
    pub receiver_expression_text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("type resolver backend unavailable: {0}")]
    Unavailable(String),
    #[error("type resolver query timed out after {0:?}")]
    Timeout(std::time::Duration),
}
