//! Player entity - a flagged account in the moderation registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::SteamId;
use crate::value_objects::AttributeList;

/// Last name and time a player was observed in game.
///
/// Informational only. Records created from chat carry an empty name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSeen {
    #[serde(default)]
    pub player_name: String,
    /// Unix seconds
    #[serde(default)]
    pub time: i64,
}

impl LastSeen {
    pub fn new(player_name: impl Into<String>, time: i64) -> Self {
        Self {
            player_name: player_name.into(),
            time,
        }
    }
}

/// A registry entry
///
/// Created by `add`, bulk import or master-list sync. After creation only
/// the proof list changes; `created_on` is fixed at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub steam_id: SteamId,
    pub attributes: AttributeList,
    pub last_seen: LastSeen,
    /// Free-text citations in append order
    pub proof: Vec<String>,
    /// Discord user id of the moderator, `0` for system imports
    pub author: u64,
    pub created_on: DateTime<Utc>,
}

impl Player {
    /// Create a new player. An empty attribute list becomes `["cheater"]`.
    pub fn new(
        steam_id: SteamId,
        attributes: AttributeList,
        author: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            steam_id,
            attributes: attributes.or_default_tag(),
            last_seen: LastSeen::new("", now.timestamp()),
            proof: Vec::new(),
            author,
            created_on: now,
        }
    }

    pub fn with_last_seen(mut self, last_seen: LastSeen) -> Self {
        self.last_seen = last_seen;
        self
    }

    pub fn with_proof(mut self, proof: Vec<String>) -> Self {
        for entry in proof {
            // Imported documents may repeat entries; keep the first.
            let _ = self.add_proof(&entry);
        }
        self
    }

    /// Append one proof entry after collapsing its whitespace.
    ///
    /// # Errors
    ///
    /// - `Validation` when nothing remains after normalization
    /// - `Constraint` when the exact entry is already present
    pub fn add_proof(&mut self, text: &str) -> Result<(), DomainError> {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(DomainError::validation("Empty proof value"));
        }
        if self.proof.contains(&normalized) {
            return Err(DomainError::constraint("Duplicate proof provided"));
        }
        self.proof.push(normalized);
        Ok(())
    }

    /// Name used in reports; falls back to the steam64 id when unknown.
    pub fn display_name(&self) -> String {
        if self.last_seen.player_name.is_empty() {
            self.steam_id.to_string()
        } else {
            self.last_seen.player_name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> Player {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid date");
        let sid = SteamId::new(76_561_198_003_911_389).expect("valid id");
        Player::new(sid, AttributeList::new(), 42, now)
    }

    #[test]
    fn new_player_defaults() {
        let player = fixture();
        assert_eq!(player.attributes.join(","), "cheater");
        assert_eq!(player.last_seen.time, player.created_on.timestamp());
        assert!(player.proof.is_empty());
        assert_eq!(player.display_name(), "76561198003911389");
    }

    #[test]
    fn add_proof_rejects_empty_and_duplicates() {
        let mut player = fixture();
        assert!(matches!(player.add_proof("   "), Err(DomainError::Validation(_))));
        player.add_proof("https://example.com/demo  1").expect("first");
        assert!(matches!(
            player.add_proof("https://example.com/demo 1"),
            Err(DomainError::Constraint(_))
        ));
        player.add_proof("second").expect("second");
        assert_eq!(player.proof, vec!["https://example.com/demo 1", "second"]);
    }

    #[test]
    fn display_name_prefers_last_seen() {
        let player = fixture().with_last_seen(LastSeen::new("baddie", 10));
        assert_eq!(player.display_name(), "baddie");
    }
}
