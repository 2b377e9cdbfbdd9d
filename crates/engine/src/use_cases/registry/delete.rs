//! `!del`: remove a player.

use std::sync::Arc;

use tf2bdd_domain::SteamId;

use crate::infrastructure::ports::{PlayerRepo, RepoError};

use super::CommandError;

pub struct DeletePlayer {
    players: Arc<dyn PlayerRepo>,
}

impl DeletePlayer {
    pub fn new(players: Arc<dyn PlayerRepo>) -> Self {
        Self { players }
    }

    pub async fn execute(&self, steam_id: SteamId) -> Result<String, CommandError> {
        if self.players.get(steam_id).await?.is_none() {
            return Err(CommandError::NotFound(steam_id));
        }

        match self.players.delete(steam_id).await {
            Ok(()) => {}
            // Removed by someone else in between
            Err(RepoError::NotFound { .. }) => return Err(CommandError::NotFound(steam_id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(steam_id = %steam_id, "Player dropped");
        Ok(format!("Dropped entry successfully: {}", steam_id))
    }
}
