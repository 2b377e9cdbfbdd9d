//! Public player list export.

use std::sync::Arc;

use tf2bdd_domain::{Attribute, FileInfo, PlayerList, PlayerListEntry};

use crate::infrastructure::ports::{PlayerRepo, RepoError};

pub struct ExportPlayerList {
    players: Arc<dyn PlayerRepo>,
    file_info: FileInfo,
    exported_attrs: Vec<Attribute>,
}

impl ExportPlayerList {
    /// An empty `exported_attrs` exports every player unchanged.
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        file_info: FileInfo,
        exported_attrs: Vec<Attribute>,
    ) -> Self {
        Self {
            players,
            file_info,
            exported_attrs,
        }
    }

    pub async fn execute(&self) -> Result<PlayerList, RepoError> {
        let players = self.players.list_all().await?;

        let entries = if self.exported_attrs.is_empty() {
            players.iter().map(PlayerListEntry::from_player).collect()
        } else {
            players
                .iter()
                .filter_map(|player| {
                    let kept = player.attributes.retain_only(&self.exported_attrs);
                    (!kept.is_empty()).then(|| PlayerListEntry::with_attributes(player, &kept))
                })
                .collect()
        };

        Ok(PlayerList::new(self.file_info.clone(), entries))
    }
}
