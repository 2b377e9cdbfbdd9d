//! Registry commands issued from chat.
//!
//! Every handler returns the single reply text or a [`CommandError`];
//! authorization and id resolution happen before they are called.

mod add;
mod check;
mod delete;
mod error;
pub mod format;
mod import;
mod proof;
mod stats;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tf2bdd_domain::SteamId;

use crate::infrastructure::ports::{ClockPort, DocumentFetcher, PlayerRepo, RepoError};

pub use add::AddPlayer;
pub use check::CheckPlayer;
pub use delete::DeletePlayer;
pub use error::CommandError;
pub use import::{Attachment, ImportPlayers, ATTACHMENT_TIMEOUT};
pub(crate) use import::{insert_new, known_ids};
pub use proof::AddProof;
pub use stats::PlayerStats;

/// Deadline for a single store call made on behalf of a command.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(15);

/// Run a store call under [`STORE_TIMEOUT`]; expiry becomes a database error
/// tagged with `operation`.
pub(crate) async fn bounded<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, RepoError>>,
) -> Result<T, RepoError> {
    tokio::time::timeout(STORE_TIMEOUT, call)
        .await
        .map_err(|_| RepoError::database(operation, "timed out"))?
}

/// Container for registry command use cases.
pub struct RegistryCommands {
    pub add: AddPlayer,
    pub delete: DeletePlayer,
    pub check: CheckPlayer,
    pub add_proof: AddProof,
    pub stats: PlayerStats,
    pub import: ImportPlayers,
    update_url: String,
}

impl RegistryCommands {
    pub fn new(
        players: Arc<dyn PlayerRepo>,
        fetcher: Arc<dyn DocumentFetcher>,
        clock: Arc<dyn ClockPort>,
        update_url: impl Into<String>,
    ) -> Self {
        Self {
            add: AddPlayer::new(players.clone(), clock.clone()),
            delete: DeletePlayer::new(players.clone()),
            check: CheckPlayer::new(players.clone()),
            add_proof: AddProof::new(players.clone()),
            stats: PlayerStats::new(players.clone()),
            import: ImportPlayers::new(players, fetcher, clock),
            update_url: update_url.into(),
        }
    }

    /// `!steamid`
    pub fn steam_id(&self, steam_id: SteamId) -> String {
        format::steam_id_block(steam_id)
    }

    /// `!link`, wrapped so the client does not unfurl it.
    pub fn link(&self) -> String {
        format!("<{}>", self.update_url)
    }
}
