//! API layer - HTTP and chat entry points.

pub mod chat;
pub mod http;

pub use chat::{CommandDispatcher, IncomingMessage};
