//! Domain types shared by the index, the dialogue resolver and the front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type JobId = String;

/// One job posting as supplied by the corpus CSV.
///
/// Every field is a display string; an empty string means the value was
/// absent in the source row. Records are immutable once the corpus is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub category: String,
    pub description: String,
    pub salary_min: String,
    pub salary_max: String,
    pub contract_type: String,
    pub contract_time: String,
    pub redirect_url: String,
}

impl JobRecord {
    /// Text fed to the embedder for this record: non-empty `title`, `company`,
    /// `description` and `category`, space-joined in that order.
    pub fn embedding_text(&self) -> String {
        [&self.title, &self.company, &self.description, &self.category]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn title_or_default(&self) -> &str { or_fallback(&self.title, "No Title") }

    pub fn company_or_default(&self) -> &str { or_fallback(&self.company, "Unknown Company") }
}

/// Returns `value` unless it is blank, in which case `fallback`.
pub fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of a session's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn now(sender: Sender, message: impl Into<String>) -> Self {
        Self { sender, message: message.into(), timestamp: Utc::now() }
    }
}

fn default_message() -> String { " ".to_string() }

fn default_session_id() -> String { "default".to_string() }

/// Body of a chat request as posted by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self { message: message.into(), session_id: session_id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
