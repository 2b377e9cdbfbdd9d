//! `!add`: insert a new player.

use std::sync::Arc;

use tf2bdd_domain::{AttributeList, Player, SteamId};

use crate::infrastructure::ports::{ClockPort, PlayerRepo, RepoError};

use super::CommandError;

pub struct AddPlayer {
    players: Arc<dyn PlayerRepo>,
    clock: Arc<dyn ClockPort>,
}

impl AddPlayer {
    pub fn new(players: Arc<dyn PlayerRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { players, clock }
    }

    /// Tags are lowercased and de-duplicated; none means `cheater`.
    pub async fn execute(
        &self,
        steam_id: SteamId,
        tags: &[String],
        author: u64,
    ) -> Result<String, CommandError> {
        let attributes = AttributeList::parse(tags)
            .map_err(|e| CommandError::invalid_input(e.to_string()))?;
        let player = Player::new(steam_id, attributes, author, self.clock.now());

        match self.players.insert(&player).await {
            Ok(()) => {}
            Err(RepoError::Duplicate { .. }) => {
                return Err(CommandError::DuplicateIdentifier(steam_id))
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            steam_id = %steam_id,
            author,
            attributes = %player.attributes.join(","),
            "Player added"
        );
        Ok(format!("Added new entry successfully: {}", steam_id))
    }
}
