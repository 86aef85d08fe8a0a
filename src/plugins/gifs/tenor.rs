use rand::Rng;
use reqwest::header::{ACCEPT, CACHE_CONTROL};

use super::errors::GifError;
use super::types::TenorSearchResponse;

pub const DEFAULT_TENOR_URL: &str = "https://tenor.googleapis.com/v2/search";
pub const DEFAULT_CLIENT_KEY: &str = "progress";

/// Upper bound (exclusive) of the random result offset.
const MAX_RANDOM_OFFSET: u32 = 10;

#[derive(Debug, Clone)]
pub struct TenorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub client_key: String,
}

impl Default for TenorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TENOR_URL.to_string(),
            api_key: None,
            client_key: DEFAULT_CLIENT_KEY.to_string(),
        }
    }
}

/// Upstream Tenor search. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TenorClient {
    http: reqwest::Client,
    config: TenorConfig,
}

impl TenorClient {
    pub fn new(config: TenorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }

    /// Returns one GIF URL for `term`, picked from a random offset so repeated
    /// searches vary.
    pub async fn search(&self, term: &str) -> Result<String, GifError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(GifError::MissingApiKey)?;

        let offset = rand::thread_rng().gen_range(0..MAX_RANDOM_OFFSET).to_string();

        tracing::debug!(target: "gifs", term, offset = %offset, "Searching Tenor");

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("q", term),
                ("key", api_key),
                ("client_key", self.config.client_key.as_str()),
                ("limit", "1"),
                ("pos", offset.as_str()),
                ("random", "true"),
                ("media_filter", "gif"),
            ])
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GifError::Upstream(status));
        }

        let body: TenorSearchResponse = response.json().await?;
        body.first_gif_url().ok_or(GifError::NoResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_without_key_fails_before_network() {
        let client = TenorClient::new(TenorConfig {
            // unroutable on purpose, the key check must come first
            base_url: "http://127.0.0.1:1/v2/search".to_string(),
            ..TenorConfig::default()
        });
        assert!(!client.has_api_key());
        assert!(matches!(
            client.search("cat").await,
            Err(GifError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_empty_key_counts_as_missing() {
        let client = TenorClient::new(TenorConfig {
            api_key: Some(String::new()),
            ..TenorConfig::default()
        });
        assert!(!client.has_api_key());
        assert!(matches!(
            client.search("cat").await,
            Err(GifError::MissingApiKey)
        ));
    }
}
