//! Chat command entry point.

mod dispatcher;
pub mod parser;

pub use dispatcher::CommandDispatcher;
pub use parser::{Action, Command, Verb};

use crate::use_cases::registry::Attachment;

/// A chat message, detached from the platform's own types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// `None` for direct messages
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub author_id: u64,
    pub content: String,
    pub attachments: Vec<Attachment>,
}
