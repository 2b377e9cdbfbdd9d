//! Steam Web API client (vanity name resolution)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tf2bdd_domain::SteamId;

use crate::infrastructure::ports::{FetchError, VanityResolver};

/// Default Steam Web API base URL.
pub const DEFAULT_STEAM_API_BASE_URL: &str = "https://api.steampowered.com";

/// `success` value for a resolved vanity name.
const RESOLVE_SUCCESS: u32 = 1;

/// Client for `ISteamUser/ResolveVanityURL`
#[derive(Clone)]
pub struct SteamWebApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SteamWebApi {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(DEFAULT_STEAM_API_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResolveVanityEnvelope {
    response: ResolveVanityResponse,
}

#[derive(Debug, Deserialize)]
struct ResolveVanityResponse {
    success: u32,
    #[serde(default)]
    steamid: Option<String>,
}

/// Map an API response to a steam id. Any non-success code is "no match".
fn parse_resolve_response(body: &[u8]) -> Result<Option<SteamId>, FetchError> {
    let envelope: ResolveVanityEnvelope =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
    let response = envelope.response;

    if response.success != RESOLVE_SUCCESS {
        return Ok(None);
    }

    let raw = response
        .steamid
        .ok_or_else(|| FetchError::InvalidResponse("missing steamid".to_string()))?;
    raw.parse::<SteamId>()
        .map(Some)
        .map_err(|e| FetchError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl VanityResolver for SteamWebApi {
    async fn resolve_vanity(&self, name: &str) -> Result<Option<SteamId>, FetchError> {
        let response = self
            .client
            .get(format!("{}/ISteamUser/ResolveVanityURL/v0001/", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("vanityurl", name)])
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        parse_resolve_response(&body)
    }
}
