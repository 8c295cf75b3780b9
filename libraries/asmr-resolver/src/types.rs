//! Types for the resolution API requests and responses.

use asmr_playback::{RemoteItem, Thumbnail, Thumbnails};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for connecting to a resolution server.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base URL of the server (e.g., "http://localhost:3000")
    pub url: String,
    /// Whole-request timeout (stream resolution runs yt-dlp, so be generous)
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Stream resolutions in flight during playlist ingestion
    pub stream_concurrency: usize,
}

impl ResolverConfig {
    /// Create a config with default timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            stream_concurrency: 4,
        }
    }

    pub fn with_stream_concurrency(mut self, concurrency: usize) -> Self {
        self.stream_concurrency = concurrency;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// =============================================================================
// Resolve playlist
// =============================================================================

/// Request body for `POST /api/yt-playlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRequest {
    pub url: String,
}

/// Response from `POST /api/yt-playlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistResponse {
    pub playlist: Vec<PlaylistEntry>,
}

/// One video of a flat playlist listing.
///
/// Mirrors the fields yt-dlp prints with `--flat-playlist --dump-json`;
/// everything except `id` is optional there. Fields not named here are kept
/// in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thumbnails: Vec<Thumbnail>,
    /// Length in seconds, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PlaylistEntry {
    /// Queue item for this entry, playing `stream_url`
    pub fn into_remote_item(self, stream_url: String) -> RemoteItem {
        let channel_label = self.channel.or(self.uploader).unwrap_or_default();
        let title = if self.title.is_empty() {
            self.id.clone()
        } else {
            self.title
        };
        RemoteItem {
            id: format!("youtube_{}", self.id),
            title,
            remote_id: self.id,
            channel_label,
            thumbnails: renditions(self.thumbnails),
            url: stream_url,
        }
    }
}

/// Sort a thumbnail list into small / medium / large renditions
pub fn renditions(mut thumbnails: Vec<Thumbnail>) -> Thumbnails {
    thumbnails.sort_by_key(|t| u64::from(t.width) * u64::from(t.height));
    let mut sized = thumbnails.into_iter();
    let default = sized.next();
    let high = sized.next_back();
    // Closest to the middle of what is left
    let rest: Vec<Thumbnail> = sized.collect();
    let medium = rest.get(rest.len() / 2).cloned();
    Thumbnails {
        default,
        medium,
        high,
    }
}

// =============================================================================
// Resolve stream
// =============================================================================

/// Request body for `POST /api/yt-stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRequest {
    pub id: String,
}

/// Response from `POST /api/yt-stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamResponse {
    pub url: String,
}

// =============================================================================
// Playlist metadata
// =============================================================================

/// Video listed by `GET /api/youtube/playlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    pub video_id: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

impl PlaylistVideo {
    pub fn into_remote_item(self, stream_url: String) -> RemoteItem {
        RemoteItem {
            id: format!("youtube_{}", self.video_id),
            title: self.title,
            remote_id: self.video_id,
            channel_label: self.channel_title,
            thumbnails: self.thumbnails,
            url: stream_url,
        }
    }
}

/// One page of playlist metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPage {
    pub items: Vec<PlaylistVideo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
