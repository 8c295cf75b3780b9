//! Shared async front end for [`Player`]
//!
//! The browser delivers events on one thread, and several of them may be in
//! flight across an await (a click waiting on `play()` while a key press
//! arrives). `PlayerHandle` shares the player behind `Rc<RefCell<_>>` and
//! never holds the borrow across an await point.

use crate::{
    error::PlayerError,
    fullscreen::FocusTarget,
    keys::KeyCommand,
    player::Player,
};
use futures::future::LocalBoxFuture;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::warn;

/// Cloneable handle to a shared [`Player`]
#[derive(Clone)]
pub struct PlayerHandle {
    inner: Rc<RefCell<Player>>,
}

impl PlayerHandle {
    pub fn new(player: Player) -> Self {
        Self {
            inner: Rc::new(RefCell::new(player)),
        }
    }

    /// Run a synchronous operation on the player
    pub fn with<R>(&self, f: impl FnOnce(&mut Player) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Read-only access to the player
    pub fn borrow(&self) -> Ref<'_, Player> {
        self.inner.borrow()
    }

    /// Pause when playing, otherwise [`PlayerHandle::prepare_and_play`]
    ///
    /// Returns whether the player is playing afterwards.
    pub async fn toggle_play(&self) -> bool {
        let playing = self.inner.borrow().state().is_playing;
        if playing {
            self.with(Player::pause);
            false
        } else {
            self.prepare_and_play().await
        }
    }

    /// Resume audio, wait for the element to buffer, then play
    ///
    /// Returns whether playback started. Refused attempts, readiness
    /// failures and rejected play all end with the player not playing.
    pub async fn prepare_and_play(&self) -> bool {
        let Some(mut attempt) = self.with(Player::begin_play) else {
            return false;
        };
        let ticket = attempt.ticket;

        if let Some(resume) = attempt.resume.take() {
            if let Err(e) = resume.await {
                warn!(error = %e, "Could not resume audio context");
            }
        }

        if let Some(readiness) = attempt.readiness.take() {
            if let Err(e) = readiness.await {
                self.with(|player| player.fail_play(ticket, e));
                return false;
            }
        }

        let Some(play) = self.with(|player| player.start_play(ticket)) else {
            return false;
        };
        let result = play.await;
        self.with(|player| player.finish_play(ticket, result))
    }

    /// Activate a queue item and start playing it
    pub async fn play_index(&self, index: usize) -> bool {
        if !self.with(|player| player.play_index(index)) {
            return false;
        }
        self.prepare_and_play().await
    }

    pub async fn next(&self) -> bool {
        if !self.with(Player::next) {
            return false;
        }
        self.prepare_and_play().await
    }

    pub async fn prev(&self) -> bool {
        if !self.with(Player::prev) {
            return false;
        }
        self.prepare_and_play().await
    }

    /// `ended` handler; plays the next item when auto-advance is on
    pub async fn on_media_ended(&self) -> bool {
        let (advanced, auto_advance) =
            self.with(|player| (player.on_media_ended(), player.config().auto_advance));
        if advanced && auto_advance {
            self.prepare_and_play().await
        } else {
            false
        }
    }

    pub async fn request_fullscreen(&self, trigger: Option<Rc<dyn FocusTarget>>) {
        let pending = self.with(|player| player.request_fullscreen(trigger));
        self.settle_fullscreen(pending).await;
    }

    pub async fn exit_fullscreen(&self) {
        let pending = self.with(Player::exit_fullscreen);
        self.settle_fullscreen(pending).await;
    }

    pub async fn toggle_fullscreen(&self, trigger: Option<Rc<dyn FocusTarget>>) {
        let pending = self.with(|player| player.toggle_fullscreen(trigger));
        self.settle_fullscreen(pending).await;
    }

    async fn settle_fullscreen(
        &self,
        pending: Option<LocalBoxFuture<'static, Result<(), PlayerError>>>,
    ) {
        if let Some(fut) = pending {
            if let Err(e) = fut.await {
                self.with(|player| player.on_fullscreen_error(Some(&e)));
            }
        }
    }

    /// Execute a keyboard command
    pub async fn run_command(&self, command: KeyCommand) {
        match command {
            KeyCommand::Seek(delta) => self.with(|player| player.handle_seek_seconds(delta)),
            KeyCommand::TogglePlay => {
                self.toggle_play().await;
            }
            KeyCommand::ToggleFullscreen => self.toggle_fullscreen(None).await,
            KeyCommand::ExitFullscreen => self.exit_fullscreen().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaElement, ReadyState, Readiness};
    use crate::testing::Rig;
    use crate::types::{PlayerConfig, RemoteItem, Thumbnails};
    use futures::executor::block_on;
    use futures::FutureExt;
    use std::task::{Context, Poll};

    fn remote(id: &str) -> RemoteItem {
        RemoteItem {
            id: id.to_string(),
            title: id.to_string(),
            remote_id: id.to_string(),
            channel_label: String::new(),
            thumbnails: Thumbnails::default(),
            url: format!("https://stream.example.com/{id}"),
        }
    }

    fn handle_with(rig: &Rig, ids: &[&str]) -> PlayerHandle {
        let handle = PlayerHandle::new(rig.player(PlayerConfig::default()));
        handle.with(|p| p.add_remote_items(ids.iter().map(|id| remote(id)).collect()));
        handle
    }

    fn noop_cx() -> Context<'static> {
        Context::from_waker(futures::task::noop_waker_ref())
    }

    #[test]
    fn toggle_play_plays_then_pauses() {
        let rig = Rig::new();
        let handle = handle_with(&rig, &["a"]);

        assert!(block_on(handle.toggle_play()));
        assert!(handle.borrow().state().is_playing);
        assert!(!rig.element.is_paused());

        assert!(!block_on(handle.toggle_play()));
        assert!(!handle.borrow().state().is_playing);
        assert!(rig.element.is_paused());
    }

    #[test]
    fn waits_for_readiness_before_playing() {
        let rig = Rig::new();
        rig.element.set_ready_on_attach(ReadyState::HaveMetadata);
        let handle = handle_with(&rig, &["a"]);

        let mut fut = handle.prepare_and_play().boxed_local();
        assert_eq!(fut.poll_unpin(&mut noop_cx()), Poll::Pending);
        assert_eq!(rig.element.play_count(), 0);

        rig.element.make_ready();
        assert_eq!(fut.poll_unpin(&mut noop_cx()), Poll::Ready(true));
        assert_eq!(rig.element.play_count(), 1);
        assert_eq!(rig.element.listener_count(), 0);
    }

    #[test]
    fn concurrent_attempt_is_refused() {
        let rig = Rig::new();
        rig.element.set_ready_on_attach(ReadyState::HaveNothing);
        let handle = handle_with(&rig, &["a"]);

        let mut first = handle.prepare_and_play().boxed_local();
        assert!(first.poll_unpin(&mut noop_cx()).is_pending());

        assert!(!block_on(handle.prepare_and_play()));

        rig.element.emit(Readiness::Ready);
        assert_eq!(first.poll_unpin(&mut noop_cx()), Poll::Ready(true));
        assert_eq!(rig.element.play_count(), 1);
    }

    #[test]
    fn timeout_leaves_player_stopped() {
        let rig = Rig::new();
        rig.element.set_ready_on_attach(ReadyState::HaveNothing);
        let handle = handle_with(&rig, &["a"]);

        let mut fut = handle.prepare_and_play().boxed_local();
        assert!(fut.poll_unpin(&mut noop_cx()).is_pending());

        rig.timer.fire_all();
        assert_eq!(fut.poll_unpin(&mut noop_cx()), Poll::Ready(false));
        assert!(!handle.borrow().state().is_playing);
        assert!(!handle.borrow().is_play_pending());
        assert_eq!(rig.element.listener_count(), 0);
    }

    #[test]
    fn switch_during_native_play_cancels_attempt() {
        let rig = Rig::new();
        rig.element.hold_play(true);
        let handle = handle_with(&rig, &["a", "b"]);

        let mut fut = handle.prepare_and_play().boxed_local();
        assert!(fut.poll_unpin(&mut noop_cx()).is_pending());
        assert_eq!(rig.element.play_count(), 1);

        handle.with(|p| p.next());
        rig.element.release_play(Ok(()));

        assert_eq!(fut.poll_unpin(&mut noop_cx()), Poll::Ready(false));
        assert!(!handle.borrow().state().is_playing);
    }

    #[test]
    fn ended_auto_advances_and_plays() {
        let rig = Rig::new();
        let handle = handle_with(&rig, &["a", "b"]);
        block_on(handle.toggle_play());

        assert!(block_on(handle.on_media_ended()));
        assert_eq!(handle.borrow().queue().current_index(), Some(1));
        assert!(handle.borrow().state().is_playing);

        assert!(!block_on(handle.on_media_ended()));
        assert!(!handle.borrow().state().is_playing);
    }

    #[test]
    fn ended_without_auto_advance_only_selects() {
        let rig = Rig::new();
        let config = PlayerConfig {
            auto_advance: false,
            ..PlayerConfig::default()
        };
        let handle = PlayerHandle::new(rig.player(config));
        handle.with(|p| p.add_remote_items(vec![remote("a"), remote("b")]));

        assert!(!block_on(handle.on_media_ended()));
        assert_eq!(handle.borrow().queue().current_index(), Some(1));
        assert!(!handle.borrow().state().is_playing);
    }

    #[test]
    fn rejected_fullscreen_routes_to_error_handler() {
        let rig = Rig::new();
        let handle = handle_with(&rig, &["a"]);
        rig.fullscreen.fail_next_request();

        block_on(handle.toggle_fullscreen(None));

        let player = handle.borrow();
        assert!(!player.state().is_fullscreen);
        drop(player);
        let events = handle.with(|p| p.drain_events());
        assert!(events
            .iter()
            .any(|e| matches!(e, crate::PlayerEvent::Error { .. })));
    }

    #[test]
    fn key_commands() {
        let rig = Rig::new();
        let handle = handle_with(&rig, &["a"]);
        rig.element.set_duration(100.0);
        rig.element.set_current_time(50.0);

        block_on(handle.run_command(KeyCommand::Seek(-5.0)));
        assert_eq!(rig.element.current_time(), 45.0);

        block_on(handle.run_command(KeyCommand::TogglePlay));
        assert!(handle.borrow().state().is_playing);

        block_on(handle.run_command(KeyCommand::ToggleFullscreen));
        handle.with(|p| p.on_fullscreen_change());
        assert!(handle.borrow().state().is_fullscreen);

        block_on(handle.run_command(KeyCommand::ExitFullscreen));
        handle.with(|p| p.on_fullscreen_change());
        assert!(!handle.borrow().state().is_fullscreen);
    }
}
