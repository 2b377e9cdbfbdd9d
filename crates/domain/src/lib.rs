//! tf2bdd domain: steam ids, player records and the shared player list
//! document. No I/O lives here.

pub mod entities;
pub mod error;
pub mod ids;
pub mod player_list;
pub mod value_objects;

pub use entities::{LastSeen, Player};
pub use error::DomainError;
pub use ids::{SteamId, STEAM64_BASE};
pub use player_list::{FileInfo, PlayerList, PlayerListEntry, PLAYER_LIST_SCHEMA, PLAYER_LIST_VERSION};
pub use value_objects::{Attribute, AttributeList, DEFAULT_ATTRIBUTE};
