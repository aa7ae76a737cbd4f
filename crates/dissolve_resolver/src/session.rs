use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::backend::BackendSession;
use crate::types::{ResolvedType, ResolverError, TypeQuery};

/// A session scoped to one file, wrapping a backend's [`BackendSession`]
/// with the uniform deadline-and-health bookkeeping described in
/// `spec.md` §4.3: "each query has a bounded wall-clock deadline... On
/// timeout, the Resolver returns `unknown` and marks the session
/// unhealthy; subsequent queries in the same file are short-circuited to
/// `unknown` without retrying the backend."
///
/// The backend session itself may not be timeout-aware (the daemon
/// backend blocks on `wait_with_output`), so the deadline is enforced
/// here by running the query on a scratch thread and racing it against
/// a `recv_timeout`. A session that has already timed out never spawns
/// another thread; it short-circuits locally.
pub struct TypeResolverSession {
    inner: Option<Box<dyn BackendSession>>,
    timeout: Duration,
    healthy: bool,
}

impl TypeResolverSession {
    pub(crate) fn new(inner: Box<dyn BackendSession>, timeout: Duration) -> Self {
        Self {
            inner: Some(inner),
            timeout,
            healthy: true,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Run one query, enforcing the session's timeout regardless of
    /// whether the wrapped backend honors it itself.
    pub fn query(&mut self, query: &TypeQuery) -> Result<ResolvedType, ResolverError> {
        if !self.healthy {
            return Ok(ResolvedType::Unknown);
        }

        let Some(mut session) = self.inner.take() else {
            return Ok(ResolvedType::Unknown);
        };

        let (tx, rx) = mpsc::channel();
        let query = query.clone();
        let handle = thread::spawn(move || {
            let result = session.query(&query);
            let _ = tx.send((session, result));
        });

        match rx.recv_timeout(self.timeout) {
            Ok((session, result)) => {
                self.inner = Some(session);
                let _ = handle.join();
                match result {
                    Ok(resolved) => Ok(resolved),
                    Err(err) => {
                        self.healthy = false;
                        Err(err)
                    }
                }
            }
            Err(_) => {
                self.healthy = false;
                // The worker thread (and the subprocess it may be blocked
                // on) is leaked deliberately: killing it safely would
                // require backend-specific process-group handling, and a
                // hung backend is rare enough that one leaked helper per
                // unhealthy session is an acceptable trade for never
                // blocking the caller past the deadline.
                Err(ResolverError::Timeout(self.timeout))
            }
        }
    }
}
