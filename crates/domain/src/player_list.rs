//! The shared player list document
//!
//! Same shape for the public export, bulk-import attachments and the
//! external master list. Decoding is lenient: unknown top-level fields are
//! ignored and every field has a default, so partially filled documents
//! from other tools still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{LastSeen, Player};
use crate::ids::SteamId;
use crate::value_objects::AttributeList;

pub const PLAYER_LIST_SCHEMA: &str =
    "https://raw.githubusercontent.com/PazerOP/tf2_bot_detector/master/schemas/v3/playerlist.schema.json";

pub const PLAYER_LIST_VERSION: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub update_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerList {
    #[serde(default)]
    pub file_info: FileInfo,
    #[serde(rename = "$schema", default = "default_schema")]
    pub schema: String,
    #[serde(default)]
    pub players: Vec<PlayerListEntry>,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_schema() -> String {
    PLAYER_LIST_SCHEMA.to_string()
}

fn default_version() -> u32 {
    PLAYER_LIST_VERSION
}

impl PlayerList {
    pub fn new(file_info: FileInfo, players: Vec<PlayerListEntry>) -> Self {
        Self {
            file_info,
            schema: default_schema(),
            players,
            version: PLAYER_LIST_VERSION,
        }
    }

    /// Decode entries into players, dropping those without a valid id.
    pub fn into_players(self, author: u64, now: DateTime<Utc>) -> Vec<Player> {
        self.players
            .into_iter()
            .filter_map(|entry| entry.into_player(author, now))
            .collect()
    }
}

/// One player in a list document.
///
/// `steamid` is kept raw so a single malformed entry does not fail the
/// whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerListEntry {
    #[serde(default)]
    pub steamid: serde_json::Value,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub last_seen: LastSeen,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proof: Vec<String>,
}

impl PlayerListEntry {
    pub fn from_player(player: &Player) -> Self {
        Self::with_attributes(player, &player.attributes)
    }

    /// Export form of `player` carrying only `attributes`.
    pub fn with_attributes(player: &Player, attributes: &AttributeList) -> Self {
        Self {
            steamid: serde_json::Value::String(player.steam_id.to_string()),
            attributes: attributes.iter().map(|a| a.as_str().to_string()).collect(),
            last_seen: player.last_seen.clone(),
            proof: player.proof.clone(),
        }
    }

    /// The entry's id, if it is a valid steam id in string or number form.
    pub fn steam_id(&self) -> Option<SteamId> {
        match &self.steamid {
            serde_json::Value::String(text) => text.parse().ok(),
            serde_json::Value::Number(number) => number.as_u64().and_then(|v| SteamId::new(v).ok()),
            _ => None,
        }
    }

    pub fn into_player(self, author: u64, now: DateTime<Utc>) -> Option<Player> {
        let steam_id = self.steam_id()?;
        let attributes = AttributeList::parse_lenient(&self.attributes);
        Some(
            Player::new(steam_id, attributes, author, now)
                .with_last_seen(self.last_seen)
                .with_proof(self.proof),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid date")
    }

    #[test]
    fn decodes_lenient_documents() {
        let raw = r#"{
            "extra": true,
            "players": [
                {"steamid": "76561198003911389", "attributes": ["Cheater", "bot"],
                 "last_seen": {"player_name": "x", "time": 5}},
                {"steamid": 76561197966480940, "attributes": []},
                {"steamid": "[U:1:5]", "attributes": ["racist"], "proof": ["a", "a"]},
                {"steamid": "bogus", "attributes": ["cheater"]},
                {"steamid": 12, "attributes": ["cheater"]},
                {"attributes": ["cheater"]}
            ]
        }"#;
        let list: PlayerList = serde_json::from_str(raw).expect("decode");
        assert_eq!(list.version, 3);

        let players = list.into_players(7, now());
        assert_eq!(players.len(), 3);
        assert_eq!(players[0].attributes.join(","), "cheater,bot");
        assert_eq!(players[0].last_seen.player_name, "x");
        assert_eq!(players[0].author, 7);
        assert_eq!(players[1].attributes.join(","), "cheater");
        assert_eq!(players[2].steam_id.account_id(), 5);
        assert_eq!(players[2].proof, vec!["a"]);
    }

    #[test]
    fn serializes_export_shape() {
        let sid = SteamId::new(76_561_198_003_911_389).expect("valid id");
        let player = Player::new(sid, AttributeList::new(), 1, now());
        let list = PlayerList::new(
            FileInfo {
                authors: vec!["anonymous".into()],
                description: "desc".into(),
                title: "title".into(),
                update_url: "http://localhost:8899/v1/steamids".into(),
            },
            vec![PlayerListEntry::from_player(&player)],
        );

        let json = serde_json::to_value(&list).expect("encode");
        assert_eq!(json["$schema"], PLAYER_LIST_SCHEMA);
        assert_eq!(json["version"], 3);
        assert_eq!(json["file_info"]["title"], "title");
        assert_eq!(json["players"][0]["steamid"], "76561198003911389");
        assert_eq!(json["players"][0]["attributes"][0], "cheater");
        assert_eq!(json["players"][0]["last_seen"]["time"], now().timestamp());
    }
}
