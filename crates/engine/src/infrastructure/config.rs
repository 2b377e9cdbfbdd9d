//! Application configuration
//!
//! Every key is read from a `TF2BDD_`-prefixed environment variable. List
//! values are comma-separated.

use std::env;

use tf2bdd_domain::{Attribute, DomainError};
use url::Url;

const ENV_PREFIX: &str = "TF2BDD_";
const STEAM_KEY_LENGTH: usize = 32;
const EXPORT_PATH: &str = "/v1/steamids";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid steam key: expected 32 characters")]
    InvalidSteamKey,
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Steam Web API key
    pub steam_key: String,
    /// Discord application id, only used for the invite link
    pub discord_client_id: String,
    pub discord_bot_token: String,
    /// Role ids allowed to run moderator commands
    pub discord_roles: Vec<u64>,

    /// Public base URL; empty means derive from the listen address
    pub external_url: String,
    pub database_path: String,
    pub listen_host: String,
    pub listen_port: u16,

    pub list_title: String,
    pub list_description: String,
    pub list_authors: Vec<String>,
    /// Attributes included in the export; empty exports everything
    pub exported_attrs: Vec<Attribute>,

    /// Optional player list merged into the registry at startup
    pub master_list_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            steam_key: String::new(),
            discord_client_id: String::new(),
            discord_bot_token: String::new(),
            discord_roles: Vec::new(),
            external_url: String::new(),
            database_path: "./db.sqlite".to_string(),
            listen_host: "localhost".to_string(),
            listen_port: 8899,
            list_title: String::new(),
            list_description: String::new(),
            list_authors: vec!["anonymous".to_string()],
            exported_attrs: Vec::new(),
            master_list_url: String::new(),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Build from a key lookup (`STEAM_KEY`, `LISTEN_PORT`, ...). Unset or
    /// blank keys keep their defaults. Does not validate.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("STEAM_KEY") {
            config.steam_key = v.trim().to_string();
        }
        if let Some(v) = get("DISCORD_CLIENT_ID") {
            config.discord_client_id = v.trim().to_string();
        }
        if let Some(v) = get("DISCORD_BOT_TOKEN") {
            config.discord_bot_token = v.trim().to_string();
        }
        if let Some(v) = get("DISCORD_ROLES") {
            config.discord_roles = split_list(&v)
                .iter()
                .map(|role| {
                    role.parse::<u64>()
                        .map_err(|_| ConfigError::invalid("DISCORD_ROLES", format!("not a role id: {role}")))
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = get("EXTERNAL_URL") {
            config.external_url = v.trim().to_string();
        }
        if let Some(v) = get("DATABASE_PATH") {
            config.database_path = v;
        }
        if let Some(v) = get("LISTEN_HOST") {
            config.listen_host = v.trim().to_string();
        }
        if let Some(v) = get("LISTEN_PORT") {
            config.listen_port = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("LISTEN_PORT", e))?;
        }
        if let Some(v) = get("LIST_TITLE") {
            config.list_title = v;
        }
        if let Some(v) = get("LIST_DESCRIPTION") {
            config.list_description = v;
        }
        if let Some(v) = get("LIST_AUTHORS") {
            config.list_authors = split_list(&v);
        }
        if let Some(v) = get("EXPORTED_ATTRS") {
            config.exported_attrs = split_list(&v)
                .iter()
                .map(Attribute::new)
                .collect::<Result<_, DomainError>>()
                .map_err(|e| ConfigError::invalid("EXPORTED_ATTRS", e))?;
        }
        if let Some(v) = get("MASTER_LIST_URL") {
            config.master_list_url = v.trim().to_string();
        }

        Ok(config)
    }

    /// Check the keys the service cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steam_key.len() != STEAM_KEY_LENGTH {
            return Err(ConfigError::InvalidSteamKey);
        }
        if self.discord_client_id.is_empty() {
            return Err(ConfigError::Missing("discord_client_id"));
        }
        if self.discord_bot_token.is_empty() {
            return Err(ConfigError::Missing("discord_bot_token"));
        }
        if self.discord_roles.is_empty() {
            return Err(ConfigError::Missing("discord_roles"));
        }
        if self.list_title.is_empty() {
            return Err(ConfigError::Missing("list_title"));
        }
        if self.list_description.is_empty() {
            return Err(ConfigError::Missing("list_description"));
        }
        self.update_url()?;
        Ok(())
    }

    /// Address the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// Public URL of the export endpoint.
    pub fn update_url(&self) -> Result<String, ConfigError> {
        let base = if self.external_url.is_empty() {
            let host = if self.listen_host.is_empty() {
                "localhost"
            } else {
                self.listen_host.as_str()
            };
            format!("http://{}:{}", host, self.listen_port)
        } else {
            self.external_url.clone()
        };

        let mut url = Url::parse(&base).map_err(|e| ConfigError::invalid("EXTERNAL_URL", e))?;
        url.set_path(EXPORT_PATH);
        Ok(url.to_string())
    }

    pub fn discord_invite_url(&self) -> String {
        format!(
            "https://discord.com/oauth2/authorize?client_id={}&scope=bot&permissions=275146361856",
            self.discord_client_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|key| vars.get(key).cloned())
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STEAM_KEY", "0123456789abcdef0123456789abcdef"),
            ("DISCORD_CLIENT_ID", "1234"),
            ("DISCORD_BOT_TOKEN", "token"),
            ("DISCORD_ROLES", "111, 222"),
            ("LIST_TITLE", "Bot Detector List"),
            ("LIST_DESCRIPTION", "Players flagged by moderators"),
        ]
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&complete()).expect("load");
        config.validate().expect("valid");
        assert_eq!(config.database_path, "./db.sqlite");
        assert_eq!(config.listen_addr(), "localhost:8899");
        assert_eq!(config.list_authors, vec!["anonymous"]);
        assert!(config.exported_attrs.is_empty());
        assert_eq!(config.discord_roles, vec![111, 222]);
        assert_eq!(
            config.update_url().expect("url"),
            "http://localhost:8899/v1/steamids"
        );
    }

    #[test]
    fn external_url_path_is_replaced() {
        let mut vars = complete();
        vars.push(("EXTERNAL_URL", "https://list.example.com/some/path"));
        vars.push(("EXPORTED_ATTRS", "Cheater,bot"));
        let config = load(&vars).expect("load");
        assert_eq!(
            config.update_url().expect("url"),
            "https://list.example.com/v1/steamids"
        );
        assert_eq!(config.exported_attrs.len(), 2);
        assert_eq!(config.exported_attrs[0].as_str(), "cheater");
    }

    #[test]
    fn validation_rejects_incomplete_config() {
        let config = load(&[]).expect("load");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSteamKey)));

        let mut vars = complete();
        vars.retain(|(k, _)| *k != "DISCORD_ROLES");
        let config = load(&vars).expect("load");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("discord_roles"))
        ));

        let mut vars = complete();
        vars[0] = ("STEAM_KEY", "short");
        assert!(matches!(
            load(&vars).expect("load").validate(),
            Err(ConfigError::InvalidSteamKey)
        ));
    }

    #[test]
    fn malformed_values_fail_to_load() {
        assert!(load(&[("LISTEN_PORT", "http")]).is_err());
        assert!(load(&[("DISCORD_ROLES", "moderators")]).is_err());
        assert!(load(&[("EXPORTED_ATTRS", "a b")]).is_err());
    }

    #[test]
    fn invite_url_carries_client_id() {
        let config = load(&complete()).expect("load");
        assert!(config
            .discord_invite_url()
            .starts_with("https://discord.com/oauth2/authorize?client_id=1234&"));
    }
}
