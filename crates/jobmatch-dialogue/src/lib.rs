pub mod detail;
pub mod endpoint;
pub mod intent;
pub mod moderation;
pub mod resolver;
pub mod runtime;
pub mod session;

pub use endpoint::{ChatOutcome, ChatService};
pub use intent::{classify, DetailKind, Intent};
pub use moderation::ModerationGate;
pub use resolver::DialogueResolver;
pub use runtime::{Runtime, StartOptions};
pub use session::{PendingSelection, SessionState, SessionStore};
