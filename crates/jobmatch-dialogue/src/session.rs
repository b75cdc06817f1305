//! Per-session conversation state.
//!
//! Each session id maps to its own async mutex. A turn holds that lock from
//! reading the pending selection until the bot reply is recorded, so turns on
//! one session are serialised while different sessions run in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use jobmatch_core::{JobRecord, Sender, Turn};
use tokio::sync::Mutex;

use crate::intent::DetailKind;

/// A multi-match detail request waiting for the user to pick a number.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    /// Candidates as shown to the user, best first.
    pub candidates: Vec<JobRecord>,
    pub detail: DetailKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingSelection,
}

#[derive(Debug, Default)]
pub struct Session {
    pub history: Vec<Turn>,
    pub pending: Option<PendingSelection>,
}

impl Session {
    pub fn state(&self) -> SessionState {
        if self.pending.is_some() { SessionState::AwaitingSelection } else { SessionState::Idle }
    }

    pub fn record(&mut self, sender: Sender, message: &str) {
        self.history.push(Turn::now(sender, message));
    }
}

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self { Self::default() }

    /// The session's lock handle, created empty on first use.
    pub fn handle(&self, session_id: &str) -> Arc<Mutex<Session>> {
        if let Some(existing) = self.sessions.get(session_id) {
            return Arc::clone(existing.value());
        }
        Arc::clone(self.sessions.entry(session_id.to_string()).or_default().value())
    }

    /// Snapshot of the conversation so far; empty for unknown sessions.
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        match self.existing(session_id) {
            Some(session) => session.lock().await.history.clone(),
            None => Vec::new(),
        }
    }

    pub async fn state(&self, session_id: &str) -> SessionState {
        match self.existing(session_id) {
            Some(session) => session.lock().await.state(),
            None => SessionState::Idle,
        }
    }

    pub async fn pending(&self, session_id: &str) -> Option<PendingSelection> {
        let session = self.existing(session_id)?;
        let guard = session.lock().await;
        guard.pending.clone()
    }

    pub fn len(&self) -> usize { self.sessions.len() }

    pub fn is_empty(&self) -> bool { self.sessions.is_empty() }

    // Clone the Arc out so no DashMap shard guard is held across an await.
    fn existing(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(session_id).map(|s| Arc::clone(s.value()))
    }
}
