//! YouTube Data API v3 client
//!
//! Only `playlistItems.list` is used; its snippets are flattened into the
//! [`PlaylistPage`] shape served by `GET /api/youtube/playlist`.

use crate::error::{Result, ServerError};
use asmr_resolver::{PlaylistPage, PlaylistVideo};
use asmr_playback::Thumbnails;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Largest page the API serves
const MAX_RESULTS: &str = "50";

#[derive(Debug, Clone)]
pub struct YouTubeApi {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<Item>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    resource_id: ResourceId,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

impl From<Item> for PlaylistVideo {
    fn from(item: Item) -> Self {
        let snippet = item.snippet;
        Self {
            id: snippet.resource_id.video_id.clone(),
            title: snippet.title,
            channel_title: snippet.channel_title,
            video_id: snippet.resource_id.video_id,
            thumbnails: snippet.thumbnails,
        }
    }
}

impl YouTubeApi {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// One page of a playlist's items
    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistPage> {
        let url = format!("{}/playlistItems", self.base_url);
        tracing::debug!(playlist_id = %playlist_id, "Fetching playlist items");

        let mut query = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", MAX_RESULTS),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServerError::Timeout("Request timeout - please try again".to_string())
                } else {
                    ServerError::Upstream(e.to_string())
                }
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::FORBIDDEN => {
                return Err(ServerError::Forbidden(
                    "YouTube API quota exceeded or invalid API key".to_string(),
                ))
            }
            StatusCode::NOT_FOUND => {
                return Err(ServerError::NotFound(
                    "Playlist not found or is private".to_string(),
                ))
            }
            status => return Err(ServerError::Upstream(format!("HTTP {status}"))),
        }

        let data: ItemsResponse = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("Invalid API response: {e}")))?;

        let page = PlaylistPage {
            items: data.items.into_iter().map(PlaylistVideo::from).collect(),
            next_page_token: data.next_page_token,
        };
        tracing::info!(playlist_id = %playlist_id, items = page.items.len(), "Fetched playlist items");
        Ok(page)
    }
}
