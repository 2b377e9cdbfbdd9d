//! Plain HTTP downloads for attachments and the master list.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::infrastructure::ports::{DocumentFetcher, FetchError};

#[derive(Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
}

impl HttpDocumentFetcher {
    pub fn new() -> Self {
        // Callers apply their own deadline; this is the hard ceiling.
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for HttpDocumentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
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
        Ok(body.to_vec())
    }
}
