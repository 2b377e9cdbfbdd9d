//! `!import`: merge player list attachments into the registry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tf2bdd_domain::{Player, PlayerList, SteamId};

use crate::infrastructure::ports::{ClockPort, DocumentFetcher, PlayerRepo, RepoError};

use super::{bounded, CommandError, STORE_TIMEOUT};

/// Per-attachment download deadline.
pub const ATTACHMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// A file attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
        }
    }
}

pub struct ImportPlayers {
    players: Arc<dyn PlayerRepo>,
    fetcher: Arc<dyn DocumentFetcher>,
    clock: Arc<dyn ClockPort>,
}

impl ImportPlayers {
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

    pub async fn execute(
        &self,
        attachments: &[Attachment],
        author: u64,
    ) -> Result<String, CommandError> {
        if attachments.is_empty() {
            return Err(CommandError::invalid_input("Must attach json file to import"));
        }

        let mut known = known_ids(self.players.as_ref()).await?;
        let mut added = 0;
        let mut last_failure = None;
        let mut failures = 0;

        for attachment in attachments {
            match self.download(attachment, author).await {
                Ok(candidates) => {
                    added += insert_new(self.players.as_ref(), candidates, &mut known).await?;
                }
                Err(reason) => {
                    tracing::warn!(
                        filename = %attachment.filename,
                        error = %reason,
                        "Skipping attachment"
                    );
                    failures += 1;
                    last_failure = Some(reason);
                }
            }
        }

        if failures == attachments.len() {
            return Err(CommandError::NetworkFailure(
                last_failure.unwrap_or_else(|| "no attachment could be loaded".to_string()),
            ));
        }

        tracing::info!(added, author, attachments = attachments.len(), "Import finished");
        Ok(format!("Loaded {} new players", added))
    }

    async fn download(&self, attachment: &Attachment, author: u64) -> Result<Vec<Player>, String> {
        let body = tokio::time::timeout(ATTACHMENT_TIMEOUT, self.fetcher.fetch(&attachment.url))
            .await
            .map_err(|_| "download timed out".to_string())?
            .map_err(|e| e.to_string())?;

        let list: PlayerList =
            serde_json::from_slice(&body).map_err(|e| format!("invalid player list: {e}"))?;
        Ok(list.into_players(author, self.clock.now()))
    }
}

/// Every id currently in the registry.
pub(crate) async fn known_ids(players: &dyn PlayerRepo) -> Result<HashSet<SteamId>, RepoError> {
    Ok(bounded("list_players", players.list_all())
        .await?
        .into_iter()
        .map(|p| p.steam_id)
        .collect())
}

/// Insert the candidates whose ids are not in `known`, recording each new
/// id. Failed inserts are logged and skipped; a stalled store aborts the
/// batch. Returns how many were added.
pub(crate) async fn insert_new(
    players: &dyn PlayerRepo,
    candidates: Vec<Player>,
    known: &mut HashSet<SteamId>,
) -> Result<usize, RepoError> {
    let mut added = 0;
    for player in candidates {
        if known.contains(&player.steam_id) {
            continue;
        }
        match tokio::time::timeout(STORE_TIMEOUT, players.insert(&player)).await {
            Err(_) => {
                tracing::error!(added, "Store timed out during bulk insert");
                return Err(RepoError::database("insert_player", "timed out"));
            }
            Ok(Ok(())) => {
                known.insert(player.steam_id);
                added += 1;
            }
            Ok(Err(RepoError::Duplicate { .. })) => {
                known.insert(player.steam_id);
            }
            Ok(Err(e)) => {
                tracing::error!(steam_id = %player.steam_id, error = %e, "Failed to add new entry");
            }
        }
    }
    Ok(added)
}
