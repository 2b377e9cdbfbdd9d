//! Domain entities - Core business objects with identity

mod player;

pub use player::{LastSeen, Player};
