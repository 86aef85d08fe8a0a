use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GifError {
    #[error("Search term is required")]
    MissingTerm,
    #[error("TENOR_API_KEY is not set")]
    MissingApiKey,
    #[error("Tenor API error: {0}")]
    Upstream(reqwest::StatusCode),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("No GIF found")]
    NoResult,
    #[error("Proxy returned status {0}")]
    Proxy(reqwest::StatusCode),
}

impl GifError {
    /// Status returned by the proxy endpoint for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GifError::MissingTerm => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message put in the `error` field. Internal details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            GifError::MissingTerm => "Search term is required",
            _ => "Failed to fetch GIF",
        }
    }
}
