//! Core types for video playback

use crate::bass::BassBoostConfig;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A user-selected local file
///
/// Carries the metadata the queue needs plus an opaque platform payload
/// (a `web_sys::File` in the browser) that the object URL factory reads.
#[derive(Clone)]
pub struct LocalFile {
    /// File name including extension
    pub name: String,

    /// MIME type reported by the platform (e.g. "video/mp4")
    pub mime_type: String,

    /// Size in bytes
    pub size: u64,

    payload: Option<Rc<dyn Any>>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            payload: None,
        }
    }

    /// Attach the platform file object
    pub fn with_payload<T: Any>(mut self, payload: T) -> Self {
        self.payload = Some(Rc::new(payload));
        self
    }

    /// Platform file object, if one of type `T` is attached
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<T>())
    }

    /// Whether the file is a video according to its MIME type
    pub fn is_video(&self) -> bool {
        self.mime_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("video/")
    }

    /// File name without its extension, used as the display title
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

/// One thumbnail rendition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Thumbnail set for a remote video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Largest available rendition
    pub fn best(&self) -> Option<&Thumbnail> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }
}

/// Queue entry backed by a local file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalItem {
    pub id: String,
    pub title: String,
    pub name: String,

    /// Object URL generated for `file`
    pub url: String,

    #[serde(skip)]
    pub file: LocalFile,
}

/// Queue entry backed by a remotely resolved stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    pub id: String,
    pub title: String,

    /// Identifier on the hosting service (YouTube video id)
    pub remote_id: String,

    #[serde(default)]
    pub channel_label: String,

    #[serde(default)]
    pub thumbnails: Thumbnails,

    /// Direct stream URL; short-lived
    pub url: String,
}

/// Playback queue entry
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueueItem {
    Local(LocalItem),
    Remote(RemoteItem),
}

impl QueueItem {
    pub fn id(&self) -> &str {
        match self {
            QueueItem::Local(item) => &item.id,
            QueueItem::Remote(item) => &item.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            QueueItem::Local(item) => &item.title,
            QueueItem::Remote(item) => &item.title,
        }
    }

    /// URL the media element plays for this entry
    pub fn url(&self) -> &str {
        match self {
            QueueItem::Local(item) => &item.url,
            QueueItem::Remote(item) => &item.url,
        }
    }

    /// Object URL to release when this entry leaves the queue
    pub fn local_url(&self) -> Option<&str> {
        match self {
            QueueItem::Local(item) => Some(&item.url),
            QueueItem::Remote(_) => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, QueueItem::Local(_))
    }
}

/// Snapshot of everything the render surface displays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub current_source_url: Option<String>,
    pub is_playing: bool,

    /// Volume in [0, 1]
    pub volume: f64,
    pub is_muted: bool,
    pub playback_rate: f64,

    /// Progress in [0, 100]
    pub progress: f64,
    pub current_time: f64,
    pub duration: f64,
    pub is_fullscreen: bool,

    /// Host reports no network; remote items will not load
    pub is_offline: bool,
}

impl PlayerState {
    pub(crate) fn new(volume: f64) -> Self {
        Self {
            current_source_url: None,
            is_playing: false,
            volume,
            is_muted: false,
            playback_rate: 1.0,
            progress: 0.0,
            current_time: 0.0,
            duration: 0.0,
            is_fullscreen: false,
            is_offline: false,
        }
    }

    /// Clear per-source playback position
    pub(crate) fn reset_transient(&mut self) {
        self.is_playing = false;
        self.progress = 0.0;
        self.current_time = 0.0;
        self.duration = 0.0;
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(0.7)
    }
}

/// Configuration for the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Initial volume (0.0-1.0, default: 0.7)
    pub initial_volume: f64,

    /// How long play waits for the element to buffer (default: 10s)
    pub readiness_timeout: Duration,

    /// Corner frequency of the bass shelf (default: 800 Hz)
    pub low_shelf_frequency_hz: f32,

    /// Step for arrow-key seeking (default: 5s)
    pub seek_step_secs: f64,

    /// Volume restored on unmute when none was recorded (default: 0.7)
    pub unmute_fallback_volume: f64,

    /// Initial bass boost settings
    pub bass: BassBoostConfig,

    /// Start the next queue item when the current one ends (default: true)
    pub auto_advance: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.7,
            readiness_timeout: Duration::from_secs(10),
            low_shelf_frequency_hz: 800.0,
            seek_step_secs: 5.0,
            unmute_fallback_volume: 0.7,
            bass: BassBoostConfig::default(),
            auto_advance: true,
        }
    }
}
