//! Repository port for the player registry.

use async_trait::async_trait;
use tf2bdd_domain::{Player, SteamId};

use super::RepoError;

/// Keyed record store for [`Player`]s.
///
/// Implementations must be safe to share between concurrent chat handlers
/// and the export endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepo: Send + Sync {
    async fn get(&self, steam_id: SteamId) -> Result<Option<Player>, RepoError>;

    /// Every player, ordered by creation time.
    async fn list_all(&self) -> Result<Vec<Player>, RepoError>;

    /// Fails with [`RepoError::Duplicate`] when the id is already present.
    async fn insert(&self, player: &Player) -> Result<(), RepoError>;

    /// Replace an existing record. Fails with [`RepoError::NotFound`] when absent.
    async fn update(&self, player: &Player) -> Result<(), RepoError>;

    /// Fails with [`RepoError::NotFound`] when absent.
    async fn delete(&self, steam_id: SteamId) -> Result<(), RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

/// A store whose calls never complete.
#[cfg(test)]
pub struct StalledPlayerRepo;

#[cfg(test)]
#[async_trait]
impl PlayerRepo for StalledPlayerRepo {
    async fn get(&self, _: SteamId) -> Result<Option<Player>, RepoError> {
        std::future::pending().await
    }

    async fn list_all(&self) -> Result<Vec<Player>, RepoError> {
        std::future::pending().await
    }

    async fn insert(&self, _: &Player) -> Result<(), RepoError> {
        std::future::pending().await
    }

    async fn update(&self, _: &Player) -> Result<(), RepoError> {
        std::future::pending().await
    }

    async fn delete(&self, _: SteamId) -> Result<(), RepoError> {
        std::future::pending().await
    }

    async fn count(&self) -> Result<u64, RepoError> {
        std::future::pending().await
    }
}
