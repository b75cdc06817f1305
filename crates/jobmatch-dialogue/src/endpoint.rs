use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use jobmatch_core::{ChatRequest, ChatResponse};
use tracing::error;

use crate::resolver::DialogueResolver;

pub const INTERNAL_ERROR: &str = "An error occurred. Please try again later.";

/// Reply plus the status a transport should report.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub status: u16,
    pub body: ChatResponse,
}

impl ChatOutcome {
    pub fn is_success(&self) -> bool { self.status == 200 }
}

/// Boundary around the resolver: failures and panics inside a turn become a
/// generic 500 reply instead of reaching the transport.
#[derive(Clone)]
pub struct ChatService {
    resolver: Arc<DialogueResolver>,
}

impl ChatService {
    pub fn new(resolver: Arc<DialogueResolver>) -> Self { Self { resolver } }

    pub fn resolver(&self) -> &Arc<DialogueResolver> { &self.resolver }

    pub async fn handle(&self, request: ChatRequest) -> ChatOutcome {
        let turn = self.resolver.respond(&request.session_id, &request.message);
        match AssertUnwindSafe(turn).catch_unwind().await {
            Ok(Ok(response)) => ChatOutcome { status: 200, body: ChatResponse { response } },
            Ok(Err(e)) => {
                error!(session_id = %request.session_id, error = %format!("{e:#}"), "error processing message");
                internal_error()
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(session_id = %request.session_id, %reason, "panic while processing message");
                internal_error()
            }
        }
    }
}

fn internal_error() -> ChatOutcome {
    ChatOutcome { status: 500, body: ChatResponse { response: INTERNAL_ERROR.to_string() } }
}
