//! SQLite-backed player registry.
//!
//! Attribute and proof lists are flattened into text columns here and
//! nowhere else: attributes comma-joined (tags never contain commas), proof
//! as a JSON array since it is free text. Timestamps are unix seconds.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tf2bdd_domain::{Attribute, AttributeList, LastSeen, Player, SteamId};

use crate::infrastructure::ports::{PlayerRepo, RepoError};

const ATTRIBUTE_SEPARATOR: &str = ",";
/// Separator of rows written before proof moved to JSON.
const LEGACY_PROOF_SEPARATOR: &str = "^^";

const SELECT_COLUMNS: &str =
    "SELECT steamid, attributes, last_seen, last_name, author, created_on, proof FROM player";

/// SQLite implementation of [`PlayerRepo`].
pub struct SqlitePlayerRepo {
    pool: SqlitePool,
}

impl SqlitePlayerRepo {
    /// Open (creating if needed) the database file at `db_path`.
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database on a single connection.
    pub async fn in_memory() -> Result<Self, RepoError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS player (
                steamid INTEGER PRIMARY KEY,
                attributes TEXT NOT NULL,
                last_seen INTEGER NOT NULL,
                last_name TEXT NOT NULL DEFAULT '',
                author INTEGER NOT NULL DEFAULT 0,
                created_on INTEGER NOT NULL,
                proof TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("migrate", e))?;

        Ok(Self { pool })
    }

    /// Wait for in-flight queries and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn to_db_int(value: u64, field: &str) -> Result<i64, RepoError> {
    i64::try_from(value).map_err(|_| RepoError::serialization(format!("{field} out of range: {value}")))
}

fn from_db_int(value: i64, field: &str) -> Result<u64, RepoError> {
    u64::try_from(value).map_err(|_| RepoError::serialization(format!("negative {field}: {value}")))
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, RepoError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| RepoError::serialization(format!("invalid timestamp: {seconds}")))
}

fn encode_proof(proof: &[String]) -> Result<String, RepoError> {
    if proof.is_empty() {
        return Ok(String::new());
    }
    serde_json::to_string(proof).map_err(RepoError::serialization)
}

fn decode_proof(raw: &str) -> Vec<String> {
    if raw.starts_with('[') {
        if let Ok(proof) = serde_json::from_str(raw) {
            return proof;
        }
    }
    raw.split(LEGACY_PROOF_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Invalid stored tags are logged and dropped.
fn decode_attributes(raw: &str, steam_id: SteamId) -> AttributeList {
    raw.split(ATTRIBUTE_SEPARATOR)
        .filter(|tag| !tag.is_empty())
        .filter_map(|tag| match Attribute::new(tag) {
            Ok(attribute) => Some(attribute),
            Err(e) => {
                tracing::warn!(steam_id = %steam_id, tag, error = %e, "Skipping stored attribute");
                None
            }
        })
        .collect()
}

fn row_to_player(row: &SqliteRow) -> Result<Player, RepoError> {
    let map_err = |e: sqlx::Error| RepoError::serialization(e);

    let raw_id: i64 = row.try_get("steamid").map_err(map_err)?;
    let steam_id = SteamId::new(from_db_int(raw_id, "steamid")?)
        .map_err(RepoError::serialization)?;

    let attributes: String = row.try_get("attributes").map_err(map_err)?;
    let attributes = decode_attributes(&attributes, steam_id);

    let last_seen = LastSeen::new(
        row.try_get::<String, _>("last_name").map_err(map_err)?,
        row.try_get::<i64, _>("last_seen").map_err(map_err)?,
    );
    let author = from_db_int(row.try_get("author").map_err(map_err)?, "author")?;
    let created_on = timestamp(row.try_get("created_on").map_err(map_err)?)?;
    let proof: String = row.try_get("proof").map_err(map_err)?;

    Ok(Player {
        steam_id,
        attributes,
        last_seen,
        proof: decode_proof(&proof),
        author,
        created_on,
    })
}

#[async_trait]
impl PlayerRepo for SqlitePlayerRepo {
    async fn get(&self, steam_id: SteamId) -> Result<Option<Player>, RepoError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE steamid = ?"))
            .bind(to_db_int(steam_id.as_u64(), "steamid")?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_player", e))?;

        row.as_ref().map(row_to_player).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Player>, RepoError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_on, steamid"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_players", e))?;

        rows.iter().map(row_to_player).collect()
    }

    async fn insert(&self, player: &Player) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO player (steamid, attributes, last_seen, last_name, author, created_on, proof)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(to_db_int(player.steam_id.as_u64(), "steamid")?)
        .bind(player.attributes.join(ATTRIBUTE_SEPARATOR))
        .bind(player.last_seen.time)
        .bind(&player.last_seen.player_name)
        .bind(to_db_int(player.author, "author")?)
        .bind(player.created_on.timestamp())
        .bind(encode_proof(&player.proof)?)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(RepoError::duplicate("Player", player.steam_id))
            }
            Err(e) => Err(RepoError::database("insert_player", e)),
        }
    }

    async fn update(&self, player: &Player) -> Result<(), RepoError> {
        // created_on is never rewritten
        let result = sqlx::query(
            r#"
            UPDATE player
            SET attributes = ?, last_seen = ?, last_name = ?, author = ?, proof = ?
            WHERE steamid = ?
            "#,
        )
        .bind(player.attributes.join(ATTRIBUTE_SEPARATOR))
        .bind(player.last_seen.time)
        .bind(&player.last_seen.player_name)
        .bind(to_db_int(player.author, "author")?)
        .bind(encode_proof(&player.proof)?)
        .bind(to_db_int(player.steam_id.as_u64(), "steamid")?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("update_player", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Player", player.steam_id));
        }
        Ok(())
    }

    async fn delete(&self, steam_id: SteamId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM player WHERE steamid = ?")
            .bind(to_db_int(steam_id.as_u64(), "steamid")?)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_player", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Player", steam_id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM player")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count_players", e))?;
        from_db_int(count, "count")
    }
}
