//! Startup merge of an external master list.

use std::sync::Arc;
use std::time::Duration;

use tf2bdd_domain::PlayerList;

use crate::infrastructure::ports::{ClockPort, DocumentFetcher, PlayerRepo, RepoError};
use crate::use_cases::registry::{insert_new, known_ids};

const MASTER_LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Author recorded for entries that did not come from a moderator.
pub const SYSTEM_AUTHOR: u64 = 0;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Master list download failed: {0}")]
    Download(String),
    #[error("Master list is not a valid player list: {0}")]
    Decode(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct SyncMasterList {
    players: Arc<dyn PlayerRepo>,
    fetcher: Arc<dyn DocumentFetcher>,
    clock: Arc<dyn ClockPort>,
}

impl SyncMasterList {
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        fetcher: Arc<dyn DocumentFetcher>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            players,
            fetcher,
            clock,
        }
    }

    /// Insert every entry of the list at `url` that is not yet known.
    /// Returns the number of players added.
    pub async fn execute(&self, url: &str) -> Result<usize, SyncError> {
        let body = tokio::time::timeout(MASTER_LIST_TIMEOUT, self.fetcher.fetch(url))
            .await
            .map_err(|_| SyncError::Download("timed out".to_string()))?
            .map_err(|e| SyncError::Download(e.to_string()))?;
        let list: PlayerList =
            serde_json::from_slice(&body).map_err(|e| SyncError::Decode(e.to_string()))?;

        let mut known = known_ids(self.players.as_ref()).await?;
        let candidates = list.into_players(SYSTEM_AUTHOR, self.clock.now());
        let total = candidates.len();
        let added = insert_new(self.players.as_ref(), candidates, &mut known).await?;

        tracing::info!(url, total, added, "Master list synced");
        Ok(added)
    }
}
