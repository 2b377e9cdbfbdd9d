//! External service ports: chat platform, Steam Web API, downloads.

use async_trait::async_trait;
use tf2bdd_domain::SteamId;

use super::{ChatError, FetchError};

/// The slice of a chat connection the command dispatcher needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// User id of the bot itself.
    fn bot_user_id(&self) -> u64;

    /// Role ids held by `user` in `guild`.
    async fn member_roles(&self, guild: u64, user: u64) -> Result<Vec<u64>, ChatError>;
}

/// Vanity name lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VanityResolver: Send + Sync {
    /// `Ok(None)` when the service reports no match.
    async fn resolve_vanity(&self, name: &str) -> Result<Option<SteamId>, FetchError>;
}

/// Raw document download (chat attachments, master list).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
