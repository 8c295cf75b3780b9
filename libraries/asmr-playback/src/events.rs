//! Player events
//!
//! Event-based communication for UI synchronization. The player queues
//! events as state changes; the host drains them after each call:
//! - Source changes (switch, clear, teardown)
//! - Play/pause transitions
//! - Queue edits and navigation
//! - Volume, bass and fullscreen changes
//! - Connectivity changes
//! - Recovered errors

use serde::Serialize;

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// The media element now plays `url` (or nothing)
    #[serde(rename_all = "camelCase")]
    SourceChanged { url: Option<String> },

    /// `is_playing` changed
    #[serde(rename_all = "camelCase")]
    PlaybackStateChanged { is_playing: bool },

    /// Items added/removed or the active index moved
    #[serde(rename_all = "camelCase")]
    QueueChanged {
        length: usize,
        current_index: Option<usize>,
    },

    #[serde(rename_all = "camelCase")]
    VolumeChanged { volume: f64, is_muted: bool },

    /// Playback speed changed
    #[serde(rename_all = "camelCase")]
    RateChanged { rate: f64 },

    #[serde(rename_all = "camelCase")]
    FullscreenChanged { is_fullscreen: bool },

    /// Network went away or came back
    #[serde(rename_all = "camelCase")]
    ConnectivityChanged { is_offline: bool },

    /// Effective low-shelf gain changed
    #[serde(rename_all = "camelCase")]
    BassGainChanged { gain_db: f32 },

    /// A failure was recovered; the message is user-displayable
    Error { message: String },
}
