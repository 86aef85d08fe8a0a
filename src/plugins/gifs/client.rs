use reqwest::header::{CACHE_CONTROL, PRAGMA};

use super::errors::GifError;
use super::server::GIFS_ROUTE;
use super::types::GifResponse;
use crate::plugins::progress::helpers::now_ms;

/// Shown whenever the proxy cannot produce a GIF.
pub const FALLBACK_GIF_URL: &str = "https://media.tenor.com/hWyrzkGxeJEAAAAC/cat-angry.gif";

/// Caller side of the GIF proxy.
#[derive(Debug, Clone)]
pub struct GifClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GifClient {
    /// `proxy_base` is the proxy origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(proxy_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{}", proxy_base.trim_end_matches('/'), GIFS_ROUTE),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Asks the proxy for a GIF. The `t` parameter busts intermediate caches.
    pub async fn try_fetch(&self, term: &str) -> Result<String, GifError> {
        let stamp = now_ms().to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", term), ("t", stamp.as_str())])
            .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GifError::Proxy(status));
        }

        let body: GifResponse = response.json().await?;
        if body.gif.is_empty() {
            return Err(GifError::NoResult);
        }
        Ok(body.gif)
    }

    /// Like [`try_fetch`](Self::try_fetch), but any failure yields [`FALLBACK_GIF_URL`].
    pub async fn fetch_or_fallback(&self, term: &str) -> String {
        match self.try_fetch(term).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(target: "gifs", term, error = %e, "Failed to fetch GIF, using fallback");
                FALLBACK_GIF_URL.to_string()
            }
        }
    }
}
