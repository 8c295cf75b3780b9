//! HTTP client for a resolution server.

use crate::error::{ResolverError, Result};
use crate::types::{
    ErrorBody, PlaylistEntry, PlaylistPage, PlaylistRequest, PlaylistResponse, ResolverConfig,
    StreamRequest, StreamResponse,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Resolves playlists and streams to playable URLs.
///
/// Implemented by [`ResolverClient`]; ingestion takes the trait so it can be
/// driven by anything that answers the same two questions.
#[async_trait(?Send)]
pub trait StreamResolver {
    /// List the videos of a playlist.
    async fn resolve_playlist(&self, playlist_url: &str) -> Result<Vec<PlaylistEntry>>;

    /// Direct, short-lived stream URL for one video.
    async fn resolve_stream(&self, video_id: &str) -> Result<String>;
}

/// Client for the resolution API.
///
/// # Example
///
/// ```ignore
/// use asmr_resolver::{ResolverClient, ResolverConfig, StreamResolver};
///
/// let client = ResolverClient::new(ResolverConfig::new("http://localhost:3000"))?;
/// let entries = client.resolve_playlist("https://www.youtube.com/playlist?list=PL123").await?;
/// let url = client.resolve_stream(&entries[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ResolverClient {
    http: Client,
    config: ResolverConfig,
}

impl ResolverClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ResolverError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ResolverError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        if config.stream_concurrency == 0 {
            return Err(ResolverError::InvalidConfig(
                "stream concurrency must be at least 1".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("AsmrPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: ResolverConfig { url, ..config },
        })
    }

    /// Server base URL, without trailing slash.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Fetch playlist metadata from the YouTube Data API proxy.
    ///
    /// Unlike [`StreamResolver::resolve_playlist`] this returns titles,
    /// channels and thumbnails without stream URLs.
    pub async fn playlist_metadata(&self, playlist_url: &str) -> Result<PlaylistPage> {
        let url = format!("{}/api/youtube/playlist", self.config.url);
        debug!(url = %url, playlist = %playlist_url, "Fetching playlist metadata");

        let response = self
            .http
            .get(&url)
            .query(&[("url", playlist_url)])
            .send()
            .await?;

        let page: PlaylistPage = parse(response, "playlist metadata").await?;
        debug!(items = page.items.len(), "Fetched playlist metadata");
        Ok(page)
    }
}

#[async_trait(?Send)]
impl StreamResolver for ResolverClient {
    async fn resolve_playlist(&self, playlist_url: &str) -> Result<Vec<PlaylistEntry>> {
        if url::Url::parse(playlist_url).is_err() {
            return Err(ResolverError::InvalidUrl(playlist_url.to_string()));
        }

        let url = format!("{}/api/yt-playlist", self.config.url);
        debug!(url = %url, playlist = %playlist_url, "Resolving playlist");

        let response = self
            .http
            .post(&url)
            .json(&PlaylistRequest {
                url: playlist_url.to_string(),
            })
            .send()
            .await?;

        let body: PlaylistResponse = parse(response, "playlist").await?;
        info!(entries = body.playlist.len(), "Resolved playlist");
        Ok(body.playlist)
    }

    async fn resolve_stream(&self, video_id: &str) -> Result<String> {
        let url = format!("{}/api/yt-stream", self.config.url);
        debug!(url = %url, video_id = %video_id, "Resolving stream");

        let response = self
            .http
            .post(&url)
            .json(&StreamRequest {
                id: video_id.to_string(),
            })
            .send()
            .await?;

        let body: StreamResponse = parse(response, "stream").await?;
        if body.url.trim().is_empty() {
            return Err(ResolverError::MissingStreamUrl(video_id.to_string()));
        }
        Ok(body.url)
    }
}

/// Decode a success body, or turn an error response into `ServerError`
async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| ResolverError::ParseError(format!("Failed to parse {} response: {}", what, e)))
    } else {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ResolverError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        // Valid URLs
        assert!(ResolverClient::new(ResolverConfig::new("https://example.com")).is_ok());
        assert!(ResolverClient::new(ResolverConfig::new("http://localhost:3000")).is_ok());

        // Invalid URLs
        assert!(ResolverClient::new(ResolverConfig::new("")).is_err());
        assert!(ResolverClient::new(ResolverConfig::new("not-a-url")).is_err());
        assert!(ResolverClient::new(ResolverConfig::new("ftp://example.com")).is_err());
    }

    #[test]
    fn test_url_normalization() {
        let client =
            ResolverClient::new(ResolverConfig::new("https://example.com/")).expect("valid url");
        assert_eq!(client.url(), "https://example.com");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = ResolverConfig::new("https://example.com").with_stream_concurrency(0);
        assert!(ResolverClient::new(config).is_err());
    }
}
