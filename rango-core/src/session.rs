/// Server-side visitor sessions
///
/// Maps an opaque session id (handed to the browser as a cookie) to that
/// visitor's [`VisitorState`]. The store is bounded; when full, the session
/// seen least recently is evicted.

use crate::visitor::VisitorState;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

struct SessionEntry {
    state: VisitorState,
    last_seen: DateTime<Utc>,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    /// (last_seen, id) for every entry, oldest first
    by_last_seen: BTreeSet<(DateTime<Utc>, String)>,
}

impl Sessions {
    fn evict_oldest(&mut self) {
        if let Some((_, id)) = self.by_last_seen.pop_first() {
            self.entries.remove(&id);
            debug!("Evicted session {} (store full)", id);
        }
    }
}

/// Shared session store, cheap to clone
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<Sessions>>,
    /// Maximum number of sessions kept (0 = unlimited)
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Sessions::default())),
            max_sessions,
        }
    }

    /// Record a visit for `session_id` at `now` and return the updated state.
    ///
    /// Unknown ids start from a fresh [`VisitorState`].
    pub fn visit(&self, session_id: &str, now: DateTime<Utc>) -> VisitorState {
        let mut guard = self.sessions.lock();
        let sessions = &mut *guard;

        if !sessions.entries.contains_key(session_id)
            && self.max_sessions > 0
            && sessions.entries.len() >= self.max_sessions
        {
            sessions.evict_oldest();
        }

        let entry = sessions
            .entries
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                state: VisitorState::new(),
                last_seen: now,
            });
        sessions
            .by_last_seen
            .remove(&(entry.last_seen, session_id.to_string()));

        entry.state.record_visit(now);
        entry.last_seen = entry.last_seen.max(now);
        sessions
            .by_last_seen
            .insert((entry.last_seen, session_id.to_string()));

        entry.state
    }

    /// Current state of a session, if known
    pub fn get(&self, session_id: &str) -> Option<VisitorState> {
        self.sessions
            .lock()
            .entries
            .get(session_id)
            .map(|entry| entry.state)
    }

    /// Number of sessions held
    pub fn count(&self) -> usize {
        self.sessions.lock().entries.len()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}
