pub mod config;
pub mod corpus;
pub mod error;
pub mod session_details;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{ChatRequest, ChatResponse, JobRecord, Sender, Turn};
