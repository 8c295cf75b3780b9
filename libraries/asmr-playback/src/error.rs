//! Error types for video playback

use std::time::Duration;
use thiserror::Error;

/// Playback errors
///
/// None of these cross the public `Player` operations: they are logged,
/// turned into [`crate::PlayerEvent::Error`] and the player falls back to a
/// safe state. Platform implementations return them from trait methods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    /// The media element rejected an operation (detach, attach, load, pause)
    #[error("Media element error: {0}")]
    Media(String),

    /// Creating or revoking a local object URL failed
    #[error("Object URL error: {0}")]
    Handle(String),

    /// The audio graph could not be built or driven
    #[error("Audio graph error: {0}")]
    AudioGraph(String),

    /// The element did not become ready before the timeout
    #[error("Media not ready after {0:?}")]
    ReadinessTimeout(Duration),

    /// The element reported an error while we waited for it
    #[error("Media failed while loading: {0}")]
    ReadinessFailed(String),

    /// Native play() was rejected (autoplay policy, unsupported source, ...)
    #[error("Playback rejected: {0}")]
    PlayRejected(String),

    /// A fullscreen request or exit failed
    #[error("Fullscreen error: {0}")]
    Fullscreen(String),

    /// A source switch is already running
    #[error("Source switch already in progress")]
    SwitchInProgress,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;
