use std::path::Path;

use crate::backend::{BackendSession, TypeResolverBackend};
use crate::types::{ResolvedType, ResolverError, TypeQuery};

/// The `--type-method none` backend (`spec.md` §6): never resolves a
/// receiver's type, so every attribute-call and magic-builtin rewrite that
/// needs a declaring class is skipped uniformly, without ever touching a
/// subprocess.
#[derive(Debug, Default)]
pub struct NullBackend;

struct NullSession;

impl BackendSession for NullSession {
    fn query(&mut self, _query: &TypeQuery) -> Result<ResolvedType, ResolverError> {
        Ok(ResolvedType::Unknown)
    }
}

impl TypeResolverBackend for NullBackend {
    fn open_session(&self, _file: &Path, _text: &str) -> Result<Box<dyn BackendSession>, ResolverError> {
        Ok(Box::new(NullSession))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
