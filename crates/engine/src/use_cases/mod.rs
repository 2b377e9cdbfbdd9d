//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area. Use cases talk to
//! infrastructure only through the port traits.

pub mod export;
pub mod master_list;
pub mod registry;
pub mod steam_id;

pub use export::ExportPlayerList;
pub use master_list::{SyncError, SyncMasterList};
pub use registry::{CommandError, RegistryCommands};
pub use steam_id::{ResolveError, SteamIdResolver};
