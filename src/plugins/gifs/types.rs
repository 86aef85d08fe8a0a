use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GifQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifResponse {
    pub gif: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Tenor v2 search payload, only the fields we read.

#[derive(Debug, Default, Deserialize)]
pub struct TenorSearchResponse {
    #[serde(default)]
    pub results: Vec<TenorResult>,
}

#[derive(Debug, Deserialize)]
pub struct TenorResult {
    #[serde(default)]
    pub media_formats: TenorMediaFormats,
}

#[derive(Debug, Default, Deserialize)]
pub struct TenorMediaFormats {
    pub gif: Option<TenorMedia>,
}

#[derive(Debug, Deserialize)]
pub struct TenorMedia {
    pub url: String,
}

impl TenorSearchResponse {
    /// URL of the first result's `gif` rendition.
    pub fn first_gif_url(self) -> Option<String> {
        self.results
            .into_iter()
            .next()?
            .media_formats
            .gif
            .map(|media| media.url)
            .filter(|url| !url.is_empty())
    }
}
