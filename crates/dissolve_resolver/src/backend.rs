use std::path::Path;

use crate::types::{ResolvedType, ResolverError, TypeQuery};

/// A live, per-file query session against a Type Resolver backend
/// (`spec.md` §4.3: "on first demand the Resolver opens a session scoped
/// to the file, warms it with the file text, and accepts multiple
/// positional queries before closing").
pub trait BackendSession: Send {
    /// Run one query against the warmed session. Implementations should
    /// *not* apply the overall deadline themselves — [`crate::TypeResolver`]
    /// enforces it uniformly across backends so the timeout policy is in
    /// exactly one place.
    fn query(&mut self, query: &TypeQuery) -> Result<ResolvedType, ResolverError>;
}

/// A pluggable Type Resolver backend (`spec.md` §4.3: "one of two pluggable
/// backends: an LSP-speaking type checker ... or a daemon-speaking type
/// checker"). The Rewriter never talks to a backend directly — only
/// through [`crate::TypeResolver`] — so both shapes are treated identically
/// per the spec's contract.
pub trait TypeResolverBackend: Send + Sync {
    /// Open (or reuse) a session scoped to `file`, warmed with `text`.
    /// Returns an error if the backend process could not be started at
    /// all (`spec.md` §4.3, "if the backend cannot start").
    fn open_session(&self, file: &Path, text: &str) -> Result<Box<dyn BackendSession>, ResolverError>;

    fn name(&self) -> &'static str;
}
