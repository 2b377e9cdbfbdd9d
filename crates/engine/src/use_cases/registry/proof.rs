//! `!addproof`: append a citation to an existing player.

use std::sync::Arc;

use tf2bdd_domain::{DomainError, SteamId};

use crate::infrastructure::ports::{PlayerRepo, RepoError};

use super::CommandError;

pub struct AddProof {
    players: Arc<dyn PlayerRepo>,
}

impl AddProof {
    pub fn new(players: Arc<dyn PlayerRepo>) -> Self {
        Self { players }
    }

    pub async fn execute(&self, steam_id: SteamId, text: &str) -> Result<String, CommandError> {
        if text.trim().is_empty() {
            return Err(CommandError::invalid_input("Empty proof value"));
        }

        let mut player = self
            .players
            .get(steam_id)
            .await?
            .ok_or(CommandError::NotFound(steam_id))?;

        player.add_proof(text).map_err(|e| match e {
            DomainError::Constraint(_) => CommandError::invalid_input("Duplicate proof provided"),
            other => CommandError::invalid_input(other.to_string()),
        })?;

        match self.players.update(&player).await {
            Ok(()) => {}
            Err(RepoError::NotFound { .. }) => return Err(CommandError::NotFound(steam_id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(steam_id = %steam_id, proofs = player.proof.len(), "Proof added");
        Ok("Added proof entry successfully".to_string())
    }
}
