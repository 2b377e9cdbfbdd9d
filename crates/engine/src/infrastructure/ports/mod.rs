//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Player storage (SQLite today)
//! - The chat platform session (Discord)
//! - Vanity name resolution (Steam Web API)
//! - Document downloads (attachments, master list)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{ChatError, FetchError, RepoError};
pub use external::{ChatSession, DocumentFetcher, VanityResolver};
pub use repos::PlayerRepo;
pub use testing::ClockPort;

#[cfg(test)]
pub use external::{MockChatSession, MockDocumentFetcher, MockVanityResolver};
#[cfg(test)]
pub use repos::{MockPlayerRepo, StalledPlayerRepo};
#[cfg(test)]
pub use testing::MockClockPort;
