//! Failures of chat commands and their user-facing rendering.

use tf2bdd_domain::SteamId;

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Cannot resolve steam id: {0}")]
    ResolutionFailed(String),
    #[error("Steam id does not exist in database: {0}")]
    NotFound(SteamId),
    #[error("Duplicate steam id: {0}")]
    DuplicateIdentifier(SteamId),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] RepoError),
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    #[error("Failed to lookup role data")]
    RoleLookupFailed,
}

impl CommandError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Text sent back to the channel. Internal failures stay terse; their
    /// detail only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::StoreUnavailable(_) => "Database error, please try again".to_string(),
            Self::NetworkFailure(_) => "Failed to download player list".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure is the server's fault rather than the user's.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::NetworkFailure(_) | Self::RoleLookupFailed)
    }
}
