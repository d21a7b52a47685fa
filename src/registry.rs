//! The Registry - shared username-to-session state.
//!
//! The Registry is the only state shared across connection tasks. It maps
//! each registered username to the [`SessionHandle`] other tasks use to
//! route lines to that client; it never owns a connection and never closes
//! one. All operations are atomic with respect to each other; `register` in
//! particular is a single compare-and-insert, so two simultaneous
//! handshakes for the same name cannot both succeed.

use crate::session::SessionHandle;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Registered username: case-sensitive, trimmed, non-empty.
pub type Username = String;

/// Concurrent mapping from username to live session.
#[derive(Default)]
pub struct Registry {
    sessions: DashMap<Username, SessionHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically insert `name` if absent; returns whether the insertion
    /// succeeded. This is the sole admission-control point for usernames.
    pub fn register(&self, name: &str, handle: SessionHandle) -> bool {
        match self.sessions.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(handle);
                true
            }
        }
    }

    /// Remove `name` if present; returns whether a removal occurred, so the
    /// caller can decide whether a departure should be announced.
    pub fn unregister(&self, name: &str) -> bool {
        self.sessions.remove(name).is_some()
    }

    /// Point lookup of a session handle.
    pub fn lookup(&self, name: &str) -> Option<SessionHandle> {
        self.sessions.get(name).map(|entry| entry.value().clone())
    }

    /// Moment-in-time snapshot of registered usernames, safe to iterate
    /// without holding any lock.
    pub fn names(&self) -> Vec<Username> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Moment-in-time snapshot of session handles for fan-out delivery.
    pub fn handles(&self) -> Vec<SessionHandle> {
        self.sessions.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Signal every live session to terminate (process shutdown). Each
    /// session observes the signal on its own queue and runs its normal
    /// cleanup path.
    pub fn shutdown_all(&self) {
        for handle in self.handles() {
            handle.shutdown();
        }
    }
}
