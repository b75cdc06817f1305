//! Turn handling: moderation, keyword routing and multi-match disambiguation.
//!
//! A session is either idle or awaiting a numeric selection. The selection is
//! read once: the next bare number consumes it (valid or not). Other
//! messages are routed normally and leave it in place; only a new multi-match
//! detail request replaces it.

use std::fmt::Write as _;
use std::sync::Arc;

use jobmatch_core::session_details::SessionDetails;
use jobmatch_core::{Sender, Turn};
use jobmatch_index::{RetrievalEngine, ScoredJob};
use tracing::{debug, info};

use crate::detail::describe;
use crate::intent::{classify, parse_ordinal, DetailKind, Intent};
use crate::moderation::ModerationGate;
use crate::session::{PendingSelection, Session, SessionState, SessionStore};

pub const BIAS_REFUSAL: &str =
    "I detected a potentially biased query. Let’s keep our conversation positive and inclusive.";
pub const INVALID_SELECTION: &str = "Invalid selection. Please try again.";
pub const JOB_NOT_FOUND: &str = "Sorry, I couldn't find that job.";
pub const NO_LISTINGS: &str = "Sorry, no job listings match your query right now.";
pub const NO_SESSIONS: &str = "Sorry, session details are not available.";
pub const HELP: &str = "I can help with job listings, session details, mentorship opportunities, and career advice. What would you like to know?";
pub const FAQ: &str = "FAQs:\n- How do I apply for a job?\n- How do I register for a session?\n- Who can join the mentorship program?";
pub const FALLBACK: &str = "I'm sorry, I didn't understand that. Could you please clarify?";

pub struct DialogueResolver {
    engine: Arc<RetrievalEngine>,
    gate: ModerationGate,
    session_details: Arc<SessionDetails>,
    sessions: SessionStore,
    preview_limit: usize,
}

impl DialogueResolver {
    pub fn new(
        engine: Arc<RetrievalEngine>,
        gate: ModerationGate,
        session_details: Arc<SessionDetails>,
        preview_limit: usize,
    ) -> Self {
        Self { engine, gate, session_details, sessions: SessionStore::new(), preview_limit: preview_limit.max(1) }
    }

    pub fn sessions(&self) -> &SessionStore { &self.sessions }

    pub fn engine(&self) -> &Arc<RetrievalEngine> { &self.engine }

    pub async fn history(&self, session_id: &str) -> Vec<Turn> { self.sessions.history(session_id).await }

    pub async fn state(&self, session_id: &str) -> SessionState { self.sessions.state(session_id).await }

    /// Handle one utterance and return the reply text. The session stays
    /// locked for the whole turn.
    pub async fn respond(&self, session_id: &str, message: &str) -> anyhow::Result<String> {
        let handle = self.sessions.handle(session_id);
        let mut session = handle.lock().await;
        session.record(Sender::User, message);
        let reply = self.turn(&mut session, message).await?;
        session.record(Sender::Bot, &reply);
        Ok(reply)
    }

    async fn turn(&self, session: &mut Session, message: &str) -> anyhow::Result<String> {
        if let Some(choice) = parse_ordinal(message) {
            if let Some(pending) = session.pending.take() {
                return Ok(select(&pending, choice));
            }
        }

        if self.gate.is_biased(message) {
            info!("biased query refused");
            return Ok(BIAS_REFUSAL.to_string());
        }

        let intent = classify(message);
        debug!(?intent, "routing message");
        match intent {
            Intent::Detail(kind) => self.detail(session, message, kind).await,
            Intent::JobSearch => self.listings(message).await,
            Intent::SessionEvents => Ok(self.session_events()),
            Intent::Help => Ok(HELP.to_string()),
            Intent::Faq => Ok(FAQ.to_string()),
            Intent::Unrecognized => Ok(FALLBACK.to_string()),
        }
    }

    async fn detail(&self, session: &mut Session, message: &str, kind: DetailKind) -> anyhow::Result<String> {
        let mut matches = self.engine.search(message).await?;
        match matches.len() {
            0 => Ok(JOB_NOT_FOUND.to_string()),
            1 => Ok(describe(&matches[0].record, kind)),
            _ => {
                matches.truncate(self.preview_limit);
                let mut reply = String::from("I found multiple jobs that match. Please specify by entering the number:\n");
                for (n, hit) in matches.iter().enumerate() {
                    let _ = writeln!(reply, "{}. {}", n + 1, headline(hit));
                }
                debug!(detail = kind.label(), candidates = matches.len(), "awaiting selection");
                session.pending = Some(PendingSelection {
                    candidates: matches.into_iter().map(|hit| hit.record).collect(),
                    detail: kind,
                });
                Ok(reply)
            }
        }
    }

    async fn listings(&self, message: &str) -> anyhow::Result<String> {
        let matches = self.engine.search(message).await?;
        if matches.is_empty() {
            return Ok(NO_LISTINGS.to_string());
        }
        let mut reply = String::from("Here are some job listings that match your query:\n");
        for hit in matches.iter().take(self.preview_limit) {
            let _ = writeln!(reply, "- {}", headline(hit));
        }
        Ok(reply)
    }

    fn session_events(&self) -> String {
        if self.session_details.is_empty() {
            return NO_SESSIONS.to_string();
        }
        let mut reply = String::from("Upcoming sessions:\n");
        for (key, detail) in self.session_details.entries() {
            let _ = writeln!(reply, "- {key}: {detail}");
        }
        reply
    }
}

fn select(pending: &PendingSelection, choice: usize) -> String {
    match choice.checked_sub(1).and_then(|i| pending.candidates.get(i)) {
        Some(record) => describe(record, pending.detail),
        None => {
            debug!(choice, candidates = pending.candidates.len(), "selection out of range");
            INVALID_SELECTION.to_string()
        }
    }
}

fn headline(hit: &ScoredJob) -> String {
    format!("{} at {}", hit.record.title_or_default(), hit.record.company_or_default())
}
