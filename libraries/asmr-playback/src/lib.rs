//! ASMR Player - Playback Core
//!
//! Platform-agnostic video playback state machine.
//!
//! This crate provides:
//! - Safe source switching (pause, detach, reset, release, attach)
//! - Exactly-once release of local object URLs
//! - Play with a bounded wait for the element to buffer
//! - Volume, mute, speed and seeking
//! - Bass boost through a low-shelf filter (presets + custom gain)
//! - A queue mixing local files and remote streams
//! - Fullscreen with focus restoration, and keyboard shortcuts
//!
//! # Architecture
//!
//! `asmr-playback` does not touch any browser API directly. The media
//! element, object URLs, Web Audio, fullscreen, timers and deferral all come
//! in through traits collected in [`Platform`]. The `web` feature provides the
//! `web-sys` implementations and a `wasm_bindgen` facade.
//!
//! [`Player`] owns the state and exposes synchronous operations.
//! [`PlayerHandle`] shares it for the async paths (play, fullscreen).
//!
//! # Example
//!
//! The fakes in `testing` need the `test-utils` feature.
//!
//! ```rust,ignore
//! use asmr_playback::testing::Rig;
//! use asmr_playback::{LocalFile, PlayerConfig, PlayerHandle};
//!
//! let rig = Rig::new();
//! let handle = PlayerHandle::new(rig.player(PlayerConfig::default()));
//!
//! handle.with(|player| {
//!     player.add_local_files(vec![LocalFile::new("rain.mp4", "video/mp4", 1024)]);
//!     player.handle_volume_change(40.0);
//! });
//!
//! let playing = futures::executor::block_on(handle.toggle_play());
//! assert!(playing);
//! ```

pub mod bass;
mod error;
mod events;
pub mod fullscreen;
mod handle;
pub mod handles;
pub mod keys;
pub mod media;
mod player;
pub mod queue;
pub mod readiness;
mod switcher;
pub mod types;
mod volume;

#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod testing;

#[cfg(feature = "web")]
pub mod web;

// Public exports
pub use bass::{AudioGraph, AudioGraphFactory, BassBoostConfig, BassPreset};
pub use error::{PlayerError, Result};
pub use events::PlayerEvent;
pub use fullscreen::{
    Deferrer, FocusTarget, FullscreenApi, FullscreenCapability, FullscreenVariant,
};
pub use handle::PlayerHandle;
pub use handles::ObjectUrlFactory;
pub use keys::{Key, KeyCommand};
pub use media::{MediaElement, ReadyState, Readiness};
pub use player::{Platform, PlayAttempt, PlayTicket, Player};
pub use readiness::Timer;
pub use types::{
    LocalFile, LocalItem, PlayerConfig, PlayerState, QueueItem, RemoteItem, Thumbnail, Thumbnails,
};
