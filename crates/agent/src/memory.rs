//! Bounded per-session state store
//!
//! One store holds every piece of cross-turn analyzer state: the services a
//! session has already matched, its emotion history ring, and the active
//! question-flow cursor. The store is owned by the orchestrator and shared
//! with the analyzers, so the eviction policy lives in exactly one place.
//!
//! Capacity is bounded: when a new session would exceed `max_sessions`, the
//! least recently used session is evicted. A single mutex guards the map and
//! the recency order together, which also serializes turns touching the same
//! session.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use nujmooz_core::EmotionHistory;

/// Cursor of an active question flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    /// Service whose flow is active
    pub service_key: String,
    /// Index into the service's flattened question list
    pub cursor: usize,
    /// Set once a scan finds no further visible question
    pub exhausted: bool,
}

impl FlowState {
    pub fn new(service_key: impl Into<String>) -> Self {
        Self {
            service_key: service_key.into(),
            cursor: 0,
            exhausted: false,
        }
    }
}

/// All analyzer state retained for one session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Services matched on prior turns, oldest first, deduplicated runs
    pub service_history: Vec<String>,
    /// Bounded emotion pattern ring
    pub emotions: EmotionHistory,
    /// Active question flow, if any
    pub flow: Option<FlowState>,
}

struct StoreInner {
    sessions: HashMap<String, SessionState>,
    /// Session ids, least recently used first
    recency: VecDeque<String>,
}

/// Bounded LRU store of [`SessionState`], keyed by session id
pub struct SessionStore {
    inner: Mutex<StoreInner>,
    max_sessions: usize,
}

impl SessionStore {
    /// Create a store retaining at most `max_sessions` sessions
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                sessions: HashMap::new(),
                recency: VecDeque::new(),
            }),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Run `f` against the session's state, creating it if absent
    ///
    /// Marks the session as most recently used and evicts the least recently
    /// used sessions if the insert crossed the capacity bound. The store lock
    /// is held while `f` runs.
    pub fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut inner = self.inner.lock();

        inner.recency.retain(|id| id != session_id);
        inner.recency.push_back(session_id.to_string());
        inner
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionState::default);

        while inner.sessions.len() > self.max_sessions {
            // The current session was just pushed to the back, so the front
            // is always another session here.
            if let Some(evicted) = inner.recency.pop_front() {
                inner.sessions.remove(&evicted);
                tracing::debug!(session = %evicted, "Evicted least recently used session");
            }
        }

        let state = inner
            .sessions
            .get_mut(session_id)
            .expect("session inserted above");
        f(state)
    }

    /// Number of retained sessions
    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().sessions.is_empty()
    }

    /// Whether a session is currently retained
    pub fn contains(&self, session_id: &str) -> bool {
        self.inner.lock().sessions.contains_key(session_id)
    }

    /// Drop a session's state explicitly
    pub fn remove(&self, session_id: &str) {
        let mut inner = self.inner.lock();
        inner.sessions.remove(session_id);
        inner.recency.retain(|id| id != session_id);
    }
}
