//! Player - core orchestration
//!
//! Coordinates the queue, source switching, handle lifecycle, volume, the
//! bass boost graph and fullscreen state around one media element.
//!
//! All operations are synchronous. Playing is split into three steps so
//! the async caller ([`crate::PlayerHandle`]) can await between them without
//! holding a borrow:
//!
//! ```text
//! begin_play ──► (resume audio, wait for readiness) ──► start_play ──► (native play) ──► finish_play
//! ```
//!
//! A source switch between the steps invalidates the attempt.

use crate::{
    bass::{AudioGraphFactory, BassBoostConfig, BassPreset, EnhancementGraph},
    error::{PlayerError, Result},
    events::PlayerEvent,
    fullscreen::{Deferrer, FocusTarget, FullscreenCapability, FullscreenCoordinator},
    handles::{HandleRegistry, ObjectUrlFactory},
    keys::{command_for, Key, KeyCommand},
    media::MediaElement,
    queue::Queue,
    readiness::{ReadinessWait, Timer},
    switcher::SourceSwitcher,
    types::{LocalFile, LocalItem, PlayerConfig, PlayerState, QueueItem, RemoteItem},
    volume::Volume,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Platform services the player drives
pub struct Platform {
    pub element: Rc<dyn MediaElement>,
    pub urls: Box<dyn ObjectUrlFactory>,
    pub audio: Box<dyn AudioGraphFactory>,
    pub fullscreen: FullscreenCapability,
    pub deferrer: Rc<dyn Deferrer>,
    pub timer: Rc<dyn Timer>,
}

/// Identifies one play attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayTicket {
    attempt: u64,
    generation: u64,
}

/// A play attempt that passed the initial checks
pub struct PlayAttempt {
    pub ticket: PlayTicket,

    /// Resume of a suspended audio context, to await first
    pub resume: Option<LocalBoxFuture<'static, Result<()>>>,

    /// Buffering wait, present when the element is not ready yet
    pub readiness: Option<ReadinessWait>,
}

/// Video player state machine
pub struct Player {
    config: PlayerConfig,
    element: Rc<dyn MediaElement>,
    timer: Rc<dyn Timer>,

    handles: HandleRegistry,
    switcher: SourceSwitcher,
    queue: Queue,
    graph: EnhancementGraph,
    fullscreen: FullscreenCoordinator,
    volume: Volume,
    state: PlayerState,

    /// Attempt currently between begin_play and finish_play
    pending_attempt: Option<u64>,
    attempts: u64,

    torn_down: bool,

    /// Events waiting for the host to drain
    pending_events: Vec<PlayerEvent>,
}

impl Player {
    /// Create a player around `platform.element`
    pub fn new(config: PlayerConfig, platform: Platform) -> Self {
        let volume = Volume::new(config.initial_volume, config.unmute_fallback_volume);
        platform.element.set_volume(volume.level());
        platform.element.set_muted(volume.is_muted());

        let mut state = PlayerState::new(volume.level());
        state.is_muted = volume.is_muted();

        Self {
            graph: EnhancementGraph::new(
                platform.audio,
                config.low_shelf_frequency_hz,
                config.bass.clone(),
            ),
            fullscreen: FullscreenCoordinator::new(platform.fullscreen, platform.deferrer),
            handles: HandleRegistry::new(platform.urls),
            element: platform.element,
            timer: platform.timer,
            switcher: SourceSwitcher::new(),
            queue: Queue::new(),
            volume,
            state,
            pending_attempt: None,
            attempts: 0,
            torn_down: false,
            pending_events: Vec::new(),
            config,
        }
    }

    // ===== Queue =====

    /// Add local files; non-video files and files the platform cannot
    /// open are skipped. Returns how many were added.
    pub fn add_local_files(&mut self, files: Vec<LocalFile>) -> usize {
        if self.is_torn_down() {
            return 0;
        }

        let mut items = Vec::with_capacity(files.len());
        for file in files {
            if !file.is_video() {
                debug!(name = %file.name, mime = %file.mime_type, "Skipping non-video file");
                continue;
            }
            let Some(url) = self.handles.create(&file) else {
                continue;
            };
            items.push(QueueItem::Local(LocalItem {
                id: Uuid::new_v4().to_string(),
                title: file.stem().to_string(),
                name: file.name.clone(),
                url,
                file,
            }));
        }
        self.append(items)
    }

    /// Add resolved remote items; returns how many were added
    pub fn add_remote_items(&mut self, items: Vec<RemoteItem>) -> usize {
        if self.is_torn_down() {
            return 0;
        }
        self.append(items.into_iter().map(QueueItem::Remote).collect())
    }

    fn append(&mut self, items: Vec<QueueItem>) -> usize {
        let added = items.len();
        if added == 0 {
            return 0;
        }

        let activated = self.queue.push_items(items);
        info!(added, length = self.queue.len(), "Added items to queue");
        if activated.is_some() {
            // A failed attach leaves the queue deselected; the items stay
            self.switch_to_current();
        }
        self.emit_queue_changed();
        added
    }

    /// Activate the item at `index`; false when out of bounds or when the
    /// source could not be attached (the queue is then deselected)
    pub fn play_index(&mut self, index: usize) -> bool {
        if self.is_torn_down() {
            return false;
        }
        if !self.queue.select(index) {
            debug!(index, length = self.queue.len(), "Queue index out of bounds");
            return false;
        }
        let switched = self.switch_to_current();
        self.emit_queue_changed();
        switched
    }

    /// Move to the next item; false at the end of the queue or when the
    /// new source could not be attached
    pub fn next(&mut self) -> bool {
        if self.is_torn_down() || self.queue.next().is_none() {
            return false;
        }
        let switched = self.switch_to_current();
        self.emit_queue_changed();
        switched
    }

    /// Move to the previous item; false at the start of the queue
    pub fn prev(&mut self) -> bool {
        if self.is_torn_down() || self.queue.prev().is_none() {
            return false;
        }
        let switched = self.switch_to_current();
        self.emit_queue_changed();
        switched
    }

    /// Remove the item at `index`
    ///
    /// Removing the active item switches to its successor (or the new last
    /// item, or nothing). If that switch fails the queue is deselected; the
    /// removal itself still stands. A removed local item's handle is released
    /// after the switch has detached it.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if self.is_torn_down() {
            return false;
        }
        let Some(removal) = self.queue.remove(index) else {
            debug!(index, length = self.queue.len(), "Queue index out of bounds");
            return false;
        };

        if removal.active_changed {
            self.switch_to_current();
        }
        if let Some(url) = removal.item.local_url() {
            self.release_if_unreferenced(url);
        }

        debug!(index, title = %removal.item.title(), "Removed queue item");
        self.emit_queue_changed();
        true
    }

    /// Empty the queue and release every queued handle
    pub fn clear_queue(&mut self) {
        if self.is_torn_down() {
            return;
        }
        let removed = self.queue.clear();
        self.switch_source(None);

        for item in &removed {
            if let Some(url) = item.local_url() {
                self.release_if_unreferenced(url);
            }
        }

        info!(removed = removed.len(), "Cleared queue");
        self.emit_queue_changed();
    }

    /// Current item finished; advances like [`Player::next`]
    ///
    /// Returns whether it advanced. On the last item the player stays put,
    /// not playing.
    pub fn on_media_ended(&mut self) -> bool {
        self.pending_attempt = None;
        self.set_playing(false);
        self.next()
    }

    /// Open a single file outside the queue
    ///
    /// The queue keeps its items but loses its selection.
    pub fn load_file(&mut self, file: LocalFile) -> bool {
        if self.is_torn_down() {
            return false;
        }
        if !file.is_video() {
            warn!(name = %file.name, mime = %file.mime_type, "Not a video file");
            self.emit_error(&PlayerError::Media(format!("{} is not a video", file.name)));
            return false;
        }
        let Some(url) = self.handles.create(&file) else {
            self.emit_error(&PlayerError::Handle(format!("Could not open {}", file.name)));
            return false;
        };

        if self.queue.current_index().is_some() {
            self.queue.deselect();
            self.emit_queue_changed();
        }
        if !self.switch_source(Some(&url)) {
            self.release_if_unreferenced(&url);
            return false;
        }
        true
    }

    fn release_if_unreferenced(&mut self, url: &str) {
        let referenced = self.queue.contains_url(url) || self.switcher.active() == Some(url);
        if !referenced && self.handles.is_outstanding(url) {
            self.handles.release(url);
        }
    }

    // ===== Source switching =====

    /// Attach the selected item; on failure the selection is dropped so the
    /// queue never points at an item that is not loaded
    fn switch_to_current(&mut self) -> bool {
        let target = self.queue.current().map(|item| item.url().to_string());
        let switched = self.switch_source(target.as_deref());
        if !switched && self.queue.current_index().is_some() {
            warn!(url = ?target, "Deselecting queue item that failed to load");
            self.queue.deselect();
        }
        switched
    }

    /// Returns whether the element now holds `url`
    fn switch_source(&mut self, url: Option<&str>) -> bool {
        let previous = self.switcher.active().map(str::to_string);
        let queue = &self.queue;
        let result = self.switcher.switch(
            self.element.as_ref(),
            &mut self.handles,
            url,
            |candidate| queue.contains_url(candidate),
        );

        if matches!(result, Err(PlayerError::SwitchInProgress)) {
            return false;
        }

        // Any pending play attempt belongs to the old source
        self.pending_attempt = None;
        let was_playing = self.state.is_playing;
        self.state.reset_transient();
        self.state.current_source_url = self.switcher.active().map(str::to_string);

        let switched = match result {
            Ok(()) => {
                if url.is_some() {
                    self.graph.ensure_built();
                }
                true
            }
            Err(e) => {
                // The switcher may have bailed before releasing the old handle
                if let Some(previous) = previous {
                    self.release_if_unreferenced(&previous);
                }
                self.emit_error(&e);
                false
            }
        };

        self.pending_events.push(PlayerEvent::SourceChanged {
            url: self.state.current_source_url.clone(),
        });
        if was_playing {
            self.pending_events
                .push(PlayerEvent::PlaybackStateChanged { is_playing: false });
        }
        switched
    }

    // ===== Transport =====

    /// Start a play attempt
    ///
    /// Returns `None` when playing is refused: during a switch, while
    /// another attempt is pending, with no source, or when already playing.
    pub fn begin_play(&mut self) -> Option<PlayAttempt> {
        if self.is_torn_down() {
            return None;
        }
        if self.switcher.is_switching() {
            debug!("Play refused, source switch in progress");
            return None;
        }
        if self.pending_attempt.is_some() {
            debug!("Play refused, another attempt is pending");
            return None;
        }
        if self.switcher.active().is_none() {
            debug!("Play refused, no source loaded");
            return None;
        }
        if self.state.is_playing {
            debug!("Already playing");
            return None;
        }

        self.attempts += 1;
        self.pending_attempt = Some(self.attempts);
        let ticket = PlayTicket {
            attempt: self.attempts,
            generation: self.switcher.generation(),
        };

        let resume = self
            .graph
            .ensure_built()
            .filter(|graph| graph.is_suspended())
            .map(|graph| graph.resume());

        let readiness = if self.element.ready_state().can_play() {
            None
        } else {
            debug!(timeout = ?self.config.readiness_timeout, "Waiting for media to buffer");
            Some(ReadinessWait::new(
                Rc::clone(&self.element),
                self.timer.as_ref(),
                self.config.readiness_timeout,
            ))
        };

        Some(PlayAttempt {
            ticket,
            resume,
            readiness,
        })
    }

    /// Readiness wait failed or timed out
    pub fn fail_play(&mut self, ticket: PlayTicket, err: PlayerError) {
        if !self.owns_attempt(ticket) {
            debug!(error = %err, "Ignoring failure of superseded play attempt");
            return;
        }
        self.pending_attempt = None;
        error!(error = %err, "Media not ready, playback not started");
        self.set_playing(false);
        self.emit_error(&err);
    }

    /// Re-check the attempt and issue native play
    ///
    /// Returns `None` when the source changed since [`Player::begin_play`].
    pub fn start_play(&mut self, ticket: PlayTicket) -> Option<LocalBoxFuture<'static, Result<()>>> {
        if !self.owns_attempt(ticket) || self.switcher.is_switching() {
            debug!("Play attempt superseded by a source change");
            if self.pending_attempt == Some(ticket.attempt) {
                self.pending_attempt = None;
            }
            return None;
        }
        Some(self.element.play())
    }

    /// Native play settled; returns whether the player is now playing
    pub fn finish_play(&mut self, ticket: PlayTicket, result: Result<()>) -> bool {
        if !self.owns_attempt(ticket) {
            debug!("Ignoring result of superseded play attempt");
            return self.state.is_playing;
        }
        self.pending_attempt = None;

        match result {
            Ok(()) => {
                self.set_playing(true);
                true
            }
            Err(e) => {
                error!(error = %e, "Native play rejected");
                self.set_playing(false);
                self.emit_error(&e);
                false
            }
        }
    }

    fn owns_attempt(&self, ticket: PlayTicket) -> bool {
        self.pending_attempt == Some(ticket.attempt)
            && self.switcher.generation() == ticket.generation
    }

    /// Whether a play attempt is between begin and finish
    pub fn is_play_pending(&self) -> bool {
        self.pending_attempt.is_some()
    }

    /// Pause playback; also abandons a pending play attempt
    pub fn pause(&mut self) {
        self.pending_attempt = None;
        if let Err(e) = self.element.pause() {
            error!(error = %e, "Failed to pause");
        }
        self.set_playing(false);
    }

    fn set_playing(&mut self, playing: bool) {
        if self.state.is_playing != playing {
            self.state.is_playing = playing;
            self.pending_events
                .push(PlayerEvent::PlaybackStateChanged { is_playing: playing });
        }
    }

    // ===== Volume and speed =====

    /// Volume slider moved (0-100)
    pub fn handle_volume_change(&mut self, percent: f64) {
        if !self.volume.set_percent(percent) {
            warn!(percent, "Ignoring invalid volume");
            return;
        }
        self.apply_volume();
    }

    /// Flip mute; unmuting restores the last audible volume
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        let level = self.volume.level();
        let muted = self.volume.is_muted();
        self.element.set_muted(muted);
        if !muted {
            self.element.set_volume(level);
        }
        self.state.volume = level;
        self.state.is_muted = muted;
        self.pending_events.push(PlayerEvent::VolumeChanged {
            volume: level,
            is_muted: muted,
        });
    }

    /// Set playback speed; non-finite or non-positive rates are ignored
    pub fn set_speed(&mut self, rate: f64) -> bool {
        if !rate.is_finite() || rate <= 0.0 {
            warn!(rate, "Ignoring invalid playback rate");
            return false;
        }
        self.element.set_playback_rate(rate);
        self.state.playback_rate = rate;
        self.pending_events.push(PlayerEvent::RateChanged { rate });
        true
    }

    // ===== Position =====

    /// Seek to a percentage of the duration; no-op while it is unknown
    pub fn handle_seek(&mut self, percent: f64) {
        let Some(duration) = self.known_duration() else {
            debug!("Seek ignored, duration unknown");
            return;
        };
        if percent.is_nan() {
            return;
        }
        let percent = percent.clamp(0.0, 100.0);
        let time = percent / 100.0 * duration;
        self.element.set_current_time(time);
        self.state.progress = percent;
        self.state.current_time = time;
    }

    /// Seek relative to the current position, clamped to the media
    pub fn handle_seek_seconds(&mut self, delta: f64) {
        let Some(duration) = self.known_duration() else {
            debug!("Seek ignored, duration unknown");
            return;
        };
        if !delta.is_finite() {
            return;
        }
        let time = (self.element.current_time() + delta).clamp(0.0, duration);
        self.element.set_current_time(time);
        self.state.current_time = time;
        self.state.progress = time / duration * 100.0;
    }

    /// `timeupdate` handler; syncs position, duration and progress
    pub fn handle_time_update(&mut self) {
        let time = self.element.current_time();
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        let duration = self.known_duration();

        self.state.current_time = time;
        self.state.duration = duration.unwrap_or(0.0);
        self.state.progress = duration.map_or(0.0, |d| (time / d * 100.0).clamp(0.0, 100.0));
    }

    fn known_duration(&self) -> Option<f64> {
        let duration = self.element.duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    // ===== Bass boost =====

    pub fn bass(&self) -> &BassBoostConfig {
        self.graph.config()
    }

    pub fn set_bass_enabled(&mut self, enabled: bool) {
        let gain_db = self.graph.set_enabled(enabled);
        self.pending_events.push(PlayerEvent::BassGainChanged { gain_db });
    }

    pub fn select_bass_preset(&mut self, preset: BassPreset) {
        let gain_db = self.graph.select_preset(preset);
        self.pending_events.push(PlayerEvent::BassGainChanged { gain_db });
    }

    pub fn set_custom_bass_gain(&mut self, gain_db: f32) {
        let gain_db = self.graph.set_custom_gain(gain_db);
        self.pending_events.push(PlayerEvent::BassGainChanged { gain_db });
    }

    pub fn is_audio_graph_built(&self) -> bool {
        self.graph.is_built()
    }

    // ===== Fullscreen =====

    /// Start entering fullscreen; await the returned future
    pub fn request_fullscreen(
        &mut self,
        trigger: Option<Rc<dyn FocusTarget>>,
    ) -> Option<LocalBoxFuture<'static, Result<()>>> {
        self.fullscreen.request(trigger)
    }

    pub fn exit_fullscreen(&mut self) -> Option<LocalBoxFuture<'static, Result<()>>> {
        self.fullscreen.exit()
    }

    pub fn toggle_fullscreen(
        &mut self,
        trigger: Option<Rc<dyn FocusTarget>>,
    ) -> Option<LocalBoxFuture<'static, Result<()>>> {
        self.fullscreen.toggle(trigger)
    }

    /// `fullscreenchange` handler
    pub fn on_fullscreen_change(&mut self) {
        let active = self.fullscreen.on_change();
        if self.state.is_fullscreen != active {
            self.state.is_fullscreen = active;
            self.pending_events
                .push(PlayerEvent::FullscreenChanged { is_fullscreen: active });
        }
    }

    /// `fullscreenerror` handler, also fed rejected request/exit futures
    pub fn on_fullscreen_error(&mut self, err: Option<&PlayerError>) {
        match err {
            Some(e) => {
                error!(error = %e, "Fullscreen request failed");
                self.emit_error(e);
            }
            None => error!("Fullscreen error"),
        }
        self.fullscreen.on_error();
        if self.state.is_fullscreen {
            self.state.is_fullscreen = false;
            self.pending_events
                .push(PlayerEvent::FullscreenChanged { is_fullscreen: false });
        }
    }

    // ===== Connectivity =====

    /// `online`/`offline` handler
    ///
    /// Only recorded and reported; playback of local items is unaffected and
    /// remote items fail through the normal error path.
    pub fn on_connectivity_change(&mut self, online: bool) {
        let offline = !online;
        if self.state.is_offline == offline {
            return;
        }
        if offline {
            warn!("Network connection lost");
        } else {
            info!("Network connection restored");
        }
        self.state.is_offline = offline;
        self.pending_events
            .push(PlayerEvent::ConnectivityChanged { is_offline: offline });
    }

    /// Map a key press to a player command
    pub fn key_command(&self, key: Key, in_text_field: bool) -> Option<KeyCommand> {
        command_for(
            key,
            self.fullscreen.is_fullscreen(),
            in_text_field,
            self.config.seek_step_secs,
        )
    }

    // ===== State =====

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Number of local handles not yet released
    pub fn outstanding_handles(&self) -> usize {
        self.handles.outstanding_count()
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlayerEvent::QueueChanged {
            length: self.queue.len(),
            current_index: self.queue.current_index(),
        });
    }

    fn emit_error(&mut self, err: &PlayerError) {
        self.pending_events.push(PlayerEvent::Error {
            message: err.to_string(),
        });
    }

    fn is_torn_down(&self) -> bool {
        if self.torn_down {
            debug!("Player already torn down");
        }
        self.torn_down
    }

    // ===== Lifecycle =====

    /// Detach the source, release every handle and close the audio graph
    ///
    /// Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.pending_attempt = None;
        self.switch_source(None);
        let released = self.handles.release_all();
        self.graph.close();
        self.torn_down = true;
        info!(released, "Player torn down");
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{ReadyState, Readiness};
    use crate::testing::Rig;
    use crate::types::Thumbnails;

    fn video(name: &str) -> LocalFile {
        LocalFile::new(name, "video/mp4", 1024)
    }

    fn remote(id: &str) -> RemoteItem {
        RemoteItem {
            id: id.to_string(),
            title: format!("Remote {id}"),
            remote_id: id.to_string(),
            channel_label: "Channel".to_string(),
            thumbnails: Thumbnails::default(),
            url: format!("https://stream.example.com/{id}"),
        }
    }

    #[test]
    fn new_player_applies_initial_volume() {
        let rig = Rig::new();
        let player = rig.player(PlayerConfig::default());

        assert_eq!(player.state().volume, 0.7);
        assert_eq!(rig.element.volume(), 0.7);
        assert!(!player.state().is_playing);
        assert_eq!(player.state().current_source_url, None);
    }

    #[test]
    fn adding_files_activates_first_video() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());

        let added = player.add_local_files(vec![
            LocalFile::new("notes.txt", "text/plain", 10),
            video("rain.mp4"),
            video("wind.webm"),
        ]);

        assert_eq!(added, 2);
        assert_eq!(player.queue().len(), 2);
        assert_eq!(player.queue().current_index(), Some(0));
        let first = player.queue().get(0).unwrap();
        assert_eq!(first.title(), "rain");
        assert_eq!(player.state().current_source_url.as_deref(), Some(first.url()));
        assert_eq!(rig.element.src().as_deref(), Some(first.url()));
        assert_eq!(player.outstanding_handles(), 2);
    }

    #[test]
    fn audio_graph_built_on_first_attach() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        assert!(!player.is_audio_graph_built());

        player.add_remote_items(vec![remote("a"), remote("b")]);
        player.next();

        assert!(player.is_audio_graph_built());
        assert_eq!(rig.audio.build_count(), 1);
        assert_eq!(rig.audio.gain_db(), Some(5.0));
    }

    #[test]
    fn remove_active_local_releases_after_switch() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_local_files(vec![video("a.mp4"), video("b.mp4")]);
        let a = player.queue().get(0).unwrap().url().to_string();
        let b = player.queue().get(1).unwrap().url().to_string();

        assert!(player.remove_at(0));

        assert_eq!(rig.urls.revoke_count(&a), 1);
        assert_eq!(rig.urls.revoke_count(&b), 0);
        assert_eq!(player.queue().current_index(), Some(0));
        assert_eq!(rig.element.src().as_deref(), Some(b.as_str()));
    }

    #[test]
    fn remove_inactive_local_releases_immediately() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_local_files(vec![video("a.mp4"), video("b.mp4")]);
        let b = player.queue().get(1).unwrap().url().to_string();
        let loads = rig.element.load_count();

        player.remove_at(1);

        assert_eq!(rig.urls.revoke_count(&b), 1);
        // Active source untouched
        assert_eq!(rig.element.load_count(), loads);
    }

    #[test]
    fn clear_releases_everything_and_detaches() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_local_files(vec![video("a.mp4"), video("b.mp4")]);
        player.add_remote_items(vec![remote("c")]);

        player.clear_queue();

        assert!(player.queue().is_empty());
        assert_eq!(player.queue().current_index(), None);
        assert_eq!(player.outstanding_handles(), 0);
        assert_eq!(rig.urls.total_revokes(), 2);
        assert_eq!(player.state().current_source_url, None);
        assert_eq!(rig.element.src(), None);
    }

    #[test]
    fn media_ended_advances_then_stops_at_end() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a"), remote("b")]);

        assert!(player.on_media_ended());
        assert_eq!(player.queue().current_index(), Some(1));

        assert!(!player.on_media_ended());
        assert_eq!(player.queue().current_index(), Some(1));
        assert!(!player.state().is_playing);
    }

    #[test]
    fn load_file_detaches_queue_selection() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_local_files(vec![video("queued.mp4")]);
        let queued = player.queue().get(0).unwrap().url().to_string();

        assert!(player.load_file(video("direct.mp4")));
        assert_eq!(player.queue().current_index(), None);
        // Queued handle survives the switch away from it
        assert_eq!(rig.urls.revoke_count(&queued), 0);

        let direct = player.state().current_source_url.clone().unwrap();
        assert!(player.load_file(video("another.mp4")));
        assert_eq!(rig.urls.revoke_count(&direct), 1);
    }

    #[test]
    fn load_file_rejects_non_video() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());

        assert!(!player.load_file(LocalFile::new("song.mp3", "audio/mpeg", 1)));
        assert!(player
            .drain_events()
            .iter()
            .any(|e| matches!(e, PlayerEvent::Error { .. })));
    }

    #[test]
    fn failed_switch_deselects_queue() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a"), remote("b")]);
        player.drain_events();

        rig.element.fail_next_load();
        assert!(!player.next());

        assert_eq!(player.queue().current_index(), None);
        assert_eq!(player.queue().len(), 2);
        assert_eq!(player.state().current_source_url, None);
        assert_eq!(rig.element.src(), None);
        assert!(player.drain_events().contains(&PlayerEvent::QueueChanged {
            length: 2,
            current_index: None
        }));

        // The queue recovers on the next successful selection
        assert!(player.play_index(1));
        assert_eq!(
            player.state().current_source_url.as_deref(),
            Some("https://stream.example.com/b")
        );
    }

    #[test]
    fn failed_activation_on_add_leaves_items_unselected() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());

        rig.element.fail_next_load();
        assert_eq!(player.add_local_files(vec![video("a.mp4")]), 1);

        assert_eq!(player.queue().current_index(), None);
        assert_eq!(player.state().current_source_url, None);
        // Still queued, so still held
        assert_eq!(player.outstanding_handles(), 1);
    }

    #[test]
    fn failed_switch_releases_unqueued_previous_handle() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        assert!(player.load_file(video("direct.mp4")));
        let direct = player.state().current_source_url.clone().unwrap();

        rig.element.fail_next_load();
        player.add_remote_items(vec![remote("a")]);

        assert_eq!(rig.urls.revoke_count(&direct), 1);
        assert_eq!(player.outstanding_handles(), 0);
        assert_eq!(player.queue().current_index(), None);
    }

    #[test]
    fn failed_load_file_releases_its_handle() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());

        rig.element.fail_next_load();
        assert!(!player.load_file(video("direct.mp4")));

        assert_eq!(player.outstanding_handles(), 0);
        assert_eq!(rig.urls.total_revokes(), 1);
        assert_eq!(player.state().current_source_url, None);
    }

    #[test]
    fn play_with_ready_element_needs_no_wait() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);

        let attempt = player.begin_play().unwrap();
        assert!(attempt.readiness.is_none());
        assert!(player.begin_play().is_none(), "second attempt must be refused");

        let play = player.start_play(attempt.ticket).unwrap();
        let result = futures::executor::block_on(play);
        assert!(player.finish_play(attempt.ticket, result));
        assert!(player.state().is_playing);
    }

    #[test]
    fn play_without_source_is_refused() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        assert!(player.begin_play().is_none());
    }

    #[test]
    fn switch_invalidates_pending_attempt() {
        let rig = Rig::new();
        rig.element.set_ready_on_attach(ReadyState::HaveNothing);
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a"), remote("b")]);

        let attempt = player.begin_play().unwrap();
        assert!(attempt.readiness.is_some());

        player.next();
        rig.element.emit(Readiness::Ready);

        assert!(player.start_play(attempt.ticket).is_none());
        assert!(!player.state().is_playing);
        assert_eq!(rig.element.play_count(), 0);
        // A fresh attempt is allowed for the new source
        assert!(player.begin_play().is_some());
    }

    #[test]
    fn readiness_failure_forces_not_playing() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);
        player.drain_events();

        let attempt = player.begin_play().unwrap();
        player.fail_play(
            attempt.ticket,
            PlayerError::ReadinessTimeout(std::time::Duration::from_secs(10)),
        );

        assert!(!player.state().is_playing);
        assert!(!player.is_play_pending());
        assert_eq!(
            player.drain_events(),
            vec![PlayerEvent::Error {
                message: "Media not ready after 10s".to_string()
            }]
        );
    }

    #[test]
    fn rejected_native_play_is_recovered() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);
        rig.element.reject_next_play("NotAllowedError");

        let attempt = player.begin_play().unwrap();
        let play = player.start_play(attempt.ticket).unwrap();
        let result = futures::executor::block_on(play);

        assert!(!player.finish_play(attempt.ticket, result));
        assert!(!player.state().is_playing);
        assert!(!player.is_play_pending());
    }

    #[test]
    fn suspended_context_is_resumed_on_play() {
        let rig = Rig::new();
        rig.audio.set_suspended(true);
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);

        let attempt = player.begin_play().unwrap();
        let resume = attempt.resume.unwrap();
        futures::executor::block_on(resume).unwrap();
        assert_eq!(rig.audio.resume_count(), 1);
    }

    #[test]
    fn volume_and_mute() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());

        player.handle_volume_change(40.0);
        assert_eq!(player.state().volume, 0.4);
        assert_eq!(rig.element.volume(), 0.4);

        player.toggle_mute();
        assert!(player.state().is_muted);
        assert_eq!(player.state().volume, 0.0);
        assert!(rig.element.muted());

        player.toggle_mute();
        assert!(!player.state().is_muted);
        assert_eq!(player.state().volume, 0.4);
        assert!(!rig.element.muted());

        player.handle_volume_change(0.0);
        assert!(player.state().is_muted);
    }

    #[test]
    fn speed_validation() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());

        assert!(player.set_speed(1.5));
        assert_eq!(rig.element.playback_rate(), 1.5);
        assert!(!player.set_speed(0.0));
        assert!(!player.set_speed(-1.0));
        assert!(!player.set_speed(f64::NAN));
        assert!(!player.set_speed(f64::INFINITY));
        assert_eq!(player.state().playback_rate, 1.5);
    }

    #[test]
    fn seek_requires_known_duration() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);

        rig.element.set_duration(f64::NAN);
        player.handle_seek(50.0);
        assert_eq!(rig.element.current_time(), 0.0);

        rig.element.set_duration(f64::INFINITY);
        player.handle_seek_seconds(5.0);
        assert_eq!(rig.element.current_time(), 0.0);

        rig.element.set_duration(200.0);
        player.handle_seek(50.0);
        assert_eq!(rig.element.current_time(), 100.0);
        assert_eq!(player.state().progress, 50.0);
    }

    #[test]
    fn relative_seek_clamps() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);
        rig.element.set_duration(60.0);

        rig.element.set_current_time(3.0);
        player.handle_seek_seconds(-5.0);
        assert_eq!(rig.element.current_time(), 0.0);

        rig.element.set_current_time(58.0);
        player.handle_seek_seconds(5.0);
        assert_eq!(rig.element.current_time(), 60.0);
    }

    #[test]
    fn time_update_computes_progress() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);

        rig.element.set_duration(80.0);
        rig.element.set_current_time(20.0);
        player.handle_time_update();
        assert_eq!(player.state().progress, 25.0);
        assert_eq!(player.state().current_time, 20.0);
        assert_eq!(player.state().duration, 80.0);

        rig.element.set_duration(f64::NAN);
        player.handle_time_update();
        assert_eq!(player.state().progress, 0.0);
        assert_eq!(player.state().duration, 0.0);
    }

    #[test]
    fn bass_changes_reach_graph() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a")]);

        player.select_bass_preset(BassPreset::High);
        assert_eq!(rig.audio.gain_db(), Some(10.0));

        player.set_custom_bass_gain(17.0);
        assert_eq!(player.bass().preset, BassPreset::Custom);
        assert_eq!(rig.audio.gain_db(), Some(17.0));

        player.set_bass_enabled(false);
        assert_eq!(rig.audio.gain_db(), Some(0.0));
    }

    #[test]
    fn teardown_releases_and_closes_once() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_local_files(vec![video("a.mp4"), video("b.mp4")]);

        player.teardown();
        player.teardown();

        assert_eq!(player.outstanding_handles(), 0);
        assert_eq!(rig.urls.total_revokes(), 2);
        assert_eq!(rig.audio.close_count(), 1);
        assert_eq!(player.add_local_files(vec![video("c.mp4")]), 0);
    }

    #[test]
    fn drop_runs_teardown() {
        let rig = Rig::new();
        {
            let mut player = rig.player(PlayerConfig::default());
            player.add_local_files(vec![video("a.mp4")]);
        }
        assert_eq!(rig.urls.total_revokes(), 1);
        assert_eq!(rig.audio.close_count(), 1);
    }

    #[test]
    fn connectivity_changes_are_reported_once() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        assert!(!player.state().is_offline);

        player.on_connectivity_change(true);
        assert!(player.drain_events().is_empty());

        player.on_connectivity_change(false);
        player.on_connectivity_change(false);
        assert!(player.state().is_offline);
        assert_eq!(
            player.drain_events(),
            vec![PlayerEvent::ConnectivityChanged { is_offline: true }]
        );

        player.on_connectivity_change(true);
        assert!(!player.state().is_offline);
        assert_eq!(
            player.drain_events(),
            vec![PlayerEvent::ConnectivityChanged { is_offline: false }]
        );
    }

    #[test]
    fn queue_events_carry_index() {
        let rig = Rig::new();
        let mut player = rig.player(PlayerConfig::default());
        player.add_remote_items(vec![remote("a"), remote("b")]);
        player.drain_events();

        player.next();
        let events = player.drain_events();
        assert!(events.contains(&PlayerEvent::QueueChanged {
            length: 2,
            current_index: Some(1)
        }));
        assert!(events.contains(&PlayerEvent::SourceChanged {
            url: Some("https://stream.example.com/b".to_string())
        }));
    }
}
