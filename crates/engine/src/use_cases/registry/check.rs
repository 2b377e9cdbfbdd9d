//! `!check`: show what the registry knows about a player.

use std::sync::Arc;

use tf2bdd_domain::SteamId;

use crate::infrastructure::ports::PlayerRepo;

use super::{format, CommandError};

pub struct CheckPlayer {
    players: Arc<dyn PlayerRepo>,
}

impl CheckPlayer {
    pub fn new(players: Arc<dyn PlayerRepo>) -> Self {
        Self { players }
    }

    pub async fn execute(&self, steam_id: SteamId) -> Result<String, CommandError> {
        let player = self
            .players
            .get(steam_id)
            .await?
            .ok_or(CommandError::NotFound(steam_id))?;
        Ok(format::check_report(&player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockPlayerRepo, RepoError};

    fn sid() -> SteamId {
        SteamId::new(76_561_198_003_911_389).expect("valid id")
    }

    #[tokio::test]
    async fn missing_player_is_not_found() {
        let mut repo = MockPlayerRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let check = CheckPlayer::new(Arc::new(repo));
        assert!(matches!(
            check.execute(sid()).await,
            Err(CommandError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let mut repo = MockPlayerRepo::new();
        repo.expect_get()
            .returning(|_| Err(RepoError::database("get_player", "locked")));

        let check = CheckPlayer::new(Arc::new(repo));
        let err = check.execute(sid()).await.expect_err("store down");
        assert!(err.is_internal());
        assert!(!err.user_message().contains("locked"));
    }
}
