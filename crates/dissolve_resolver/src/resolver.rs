use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::TypeResolverBackend;
use crate::session::TypeResolverSession;
use crate::types::ResolverError;

/// Default per-query deadline (`spec.md` §4.3: "a sensible default (10
/// seconds)").
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The Type Resolver (`spec.md` §4.3): a thin facade over one pluggable
/// [`TypeResolverBackend`] that owns the uniform timeout policy, so the
/// Rewriter never needs to know which backend it is talking to.
#[derive(Clone)]
pub struct TypeResolver {
    backend: Arc<dyn TypeResolverBackend>,
    timeout: Duration,
}

impl TypeResolver {
    pub fn new(backend: Arc<dyn TypeResolverBackend>) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Open a session scoped to `file`, warmed with `text`. Per `spec.md`
    /// §4.3, a backend that fails to start degrades to an always-`unknown`
    /// session rather than aborting the run: "if the backend cannot
    /// start... the Resolver logs a warning once and resolves every
    /// subsequent query in the run to `unknown`."
    pub fn open_session(&self, file: &Path, text: &str) -> TypeResolverSession {
        match self.backend.open_session(file, text) {
            Ok(backend_session) => TypeResolverSession::new(backend_session, self.timeout),
            Err(err) => {
                tracing::warn!(
                    backend = self.backend.name(),
                    file = %file.display(),
                    error = %err,
                    "type resolver backend unavailable, degrading to unknown",
                );
                TypeResolverSession::new(Box::new(UnavailableSession), self.timeout)
            }
        }
    }
}

struct UnavailableSession;

impl crate::backend::BackendSession for UnavailableSession {
    fn query(&mut self, _query: &crate::types::TypeQuery) -> Result<crate::types::ResolvedType, ResolverError> {
        Ok(crate::types::ResolvedType::Unknown)
    }
}
