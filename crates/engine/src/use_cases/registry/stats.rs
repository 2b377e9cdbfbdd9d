//! `!count`: registry totals.

use std::sync::Arc;

use crate::infrastructure::ports::PlayerRepo;

use super::{format, CommandError};

pub struct PlayerStats {
    players: Arc<dyn PlayerRepo>,
}

impl PlayerStats {
    pub fn new(players: Arc<dyn PlayerRepo>) -> Self {
        Self { players }
    }

    pub async fn execute(&self) -> Result<String, CommandError> {
        let players = self.players.list_all().await?;
        Ok(format::count_block(&players))
    }
}
