//! Application state and composition.

use std::sync::Arc;

use tf2bdd_domain::FileInfo;

use crate::api::chat::CommandDispatcher;
use crate::infrastructure::{
    config::{AppConfig, ConfigError},
    ports::{ClockPort, DocumentFetcher, PlayerRepo, VanityResolver},
};
use crate::use_cases;

/// Main application state.
///
/// Shared by the HTTP routes (via Axum state) and the Discord handler.
pub struct App {
    pub use_cases: UseCases,
    /// Chat entry point; owns the registry commands and the id resolver.
    pub dispatcher: Arc<CommandDispatcher>,
}

/// Use cases driven from outside chat.
pub struct UseCases {
    pub export: use_cases::ExportPlayerList,
    pub master_list: use_cases::SyncMasterList,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        config: &AppConfig,
        players: Arc<dyn PlayerRepo>,
        vanity: Arc<dyn VanityResolver>,
        fetcher: Arc<dyn DocumentFetcher>,
        clock: Arc<dyn ClockPort>,
    ) -> Result<Self, ConfigError> {
        let update_url = config.update_url()?;

        let registry = Arc::new(use_cases::RegistryCommands::new(
            players.clone(),
            fetcher.clone(),
            clock.clone(),
            update_url.clone(),
        ));
        let resolver = Arc::new(use_cases::SteamIdResolver::new(vanity));

        let file_info = FileInfo {
            authors: config.list_authors.clone(),
            description: config.list_description.clone(),
            title: config.list_title.clone(),
            update_url,
        };
        let export = use_cases::ExportPlayerList::new(
            players.clone(),
            file_info,
            config.exported_attrs.clone(),
        );
        let master_list = use_cases::SyncMasterList::new(players, fetcher, clock);

        let dispatcher = Arc::new(CommandDispatcher::new(
            registry,
            resolver,
            config.discord_roles.clone(),
        ));

        Ok(Self {
            use_cases: UseCases {
                export,
                master_list,
            },
            dispatcher,
        })
    }
}
