//! The Type Resolver (`spec.md` §4.3): resolves a receiver expression's
//! declaring class through a pluggable backend, on a bounded per-query
//! timeout, degrading to `unknown` whenever the backend is slow, absent,
//! or disabled outright (`--type-method none`).

mod backend;
mod daemon;
mod lsp;
mod null;
mod resolver;
mod session;
mod types;

pub use backend::{BackendSession, TypeResolverBackend};
pub use daemon::DaemonBackend;
pub use lsp::LspBackend;
pub use null::NullBackend;
pub use resolver::{TypeResolver, DEFAULT_TIMEOUT};
pub use session::TypeResolverSession;
pub use types::{ResolvedType, ResolverError, TypeQuery};

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use ruff_text_size::TextSize;

    use super::*;

    fn query() -> TypeQuery {
        TypeQuery {
            file: PathBuf::from("pkg/mod.py"),
            offset: TextSize::from(0),
            receiver_expression_text: "widget".to_string(),
        }
    }

    #[test]
    fn null_backend_always_resolves_unknown() {
        let resolver = TypeResolver::new(Arc::new(NullBackend));
        let mut session = resolver.open_session(&PathBuf::from("pkg/mod.py"), "widget = Widget()\n");
        let resolved = session.query(&query()).unwrap();
        assert_eq!(resolved, ResolvedType::Unknown);
        assert!(session.is_healthy());
    }

    struct TimeoutBackend;

    struct TimeoutSession;

    impl BackendSession for TimeoutSession {
        fn query(&mut self, _query: &TypeQuery) -> Result<ResolvedType, ResolverError> {
            std::thread::sleep(Duration::from_millis(50));
            Ok(ResolvedType::Known("pkg.Widget".to_string()))
        }
    }

    impl TypeResolverBackend for TimeoutBackend {
        fn open_session(&self, _file: &std::path::Path, _text: &str) -> Result<Box<dyn BackendSession>, ResolverError> {
            Ok(Box::new(TimeoutSession))
        }

        fn name(&self) -> &'static str {
            "timeout-test"
        }
    }

    #[test]
    fn slow_backend_times_out_and_becomes_unhealthy() {
        let resolver = TypeResolver::new(Arc::new(TimeoutBackend)).with_timeout(Duration::from_millis(5));
        let mut session = resolver.open_session(&PathBuf::from("pkg/mod.py"), "widget = Widget()\n");

        let first = session.query(&query());
        assert!(matches!(first, Err(ResolverError::Timeout(_))));
        assert!(!session.is_healthy());

        // A subsequent query on the same session short-circuits to
        // `unknown` instead of spawning another worker against the
        // slow backend.
        let second = session.query(&query()).unwrap();
        assert_eq!(second, ResolvedType::Unknown);
    }

    struct UnavailableBackend;

    impl TypeResolverBackend for UnavailableBackend {
        fn open_session(&self, _file: &std::path::Path, _text: &str) -> Result<Box<dyn BackendSession>, ResolverError> {
            Err(ResolverError::Unavailable("not installed".to_string()))
        }

        fn name(&self) -> &'static str {
            "unavailable-test"
        }
    }

    #[test]
    fn unavailable_backend_degrades_to_unknown_session() {
        let resolver = TypeResolver::new(Arc::new(UnavailableBackend));
        let mut session = resolver.open_session(&PathBuf::from("pkg/mod.py"), "widget = Widget()\n");
        let resolved = session.query(&query()).unwrap();
        assert_eq!(resolved, ResolvedType::Unknown);
    }

    #[test]
    fn daemon_backend_parses_reveal_type_through_session() {
        // Exercises the caching path via a fake backend shaped like
        // DaemonBackend but without spawning a real mypy subprocess.
        struct FakeDaemon;
        struct FakeDaemonSession {
            calls: std::cell::Cell<u32>,
        }

        impl BackendSession for FakeDaemonSession {
            fn query(&mut self, _query: &TypeQuery) -> Result<ResolvedType, ResolverError> {
                self.calls.set(self.calls.get() + 1);
                Ok(ResolvedType::Known("pkg.Widget".to_string()))
            }
        }

        impl TypeResolverBackend for FakeDaemon {
            fn open_session(&self, _file: &std::path::Path, _text: &str) -> Result<Box<dyn BackendSession>, ResolverError> {
                Ok(Box::new(FakeDaemonSession { calls: std::cell::Cell::new(0) }))
            }

            fn name(&self) -> &'static str {
                "fake-daemon"
            }
        }

        let resolver = TypeResolver::new(Arc::new(FakeDaemon));
        let mut session = resolver.open_session(&PathBuf::from("pkg/mod.py"), "widget = Widget()\n");
        let resolved = session.query(&query()).unwrap();
        assert_eq!(resolved.as_known(), Some("pkg.Widget"));
    }
}
