//! In-memory accounting session set
//!
//! Tracks sessions between Acct-Start and Acct-Stop, keyed by
//! Acct-Session-Id. Purely in-memory: contents are lost on restart, which is
//! an accepted limit of this engine.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::SystemTime;

/// One active accounting session
#[derive(Debug, Clone)]
pub struct Session {
    pub username: Option<String>,
    pub nas_identifier: Option<String>,
    pub started_at: SystemTime,
}

impl Session {
    pub fn new(username: Option<String>, nas_identifier: Option<String>) -> Self {
        Session {
            username,
            nas_identifier,
            started_at: SystemTime::now(),
        }
    }
}

/// Concurrent set of active sessions, shared across packet workers
#[derive(Debug, Default)]
pub struct SessionSet {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session start; an existing session with the same id is replaced
    pub fn start(&self, session_id: impl Into<String>, session: Session) {
        self.write().insert(session_id.into(), session);
    }

    /// Record a session stop, returning the session if it was known
    pub fn stop(&self, session_id: &str) -> Option<Session> {
        self.write().remove(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.read().contains_key(session_id)
    }

    /// Session ids currently active, in no particular order
    pub fn active(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}
