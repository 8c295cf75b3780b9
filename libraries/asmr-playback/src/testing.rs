//! In-memory platform fakes
//!
//! Used by unit and integration tests. Every fake records what the player did
//! to it and can be told to fail its next call.

use crate::{
    bass::{AudioGraph, AudioGraphFactory},
    error::{PlayerError, Result},
    fullscreen::{Deferrer, FocusTarget, FullscreenApi, FullscreenCapability, FullscreenVariant},
    handles::ObjectUrlFactory,
    media::{ListenerId, MediaElement, ReadinessListener, ReadyState, Readiness},
    player::{Platform, Player},
    readiness::Timer,
    types::{LocalFile, PlayerConfig},
};
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Duration the fake reports after a source is attached
pub const FAKE_DURATION_SECS: f64 = 100.0;

// ===== Media element =====

/// Scriptable stand-in for a video element
pub struct FakeElement {
    paused: Cell<bool>,
    ready: Cell<ReadyState>,
    ready_on_attach: Cell<ReadyState>,
    src: RefCell<Option<String>>,
    current_time: Cell<f64>,
    duration: Cell<f64>,
    volume: Cell<f64>,
    muted: Cell<bool>,
    playback_rate: Cell<f64>,

    listeners: RefCell<Vec<(ListenerId, ReadinessListener)>>,
    next_listener: Cell<u64>,

    load_count: Cell<usize>,
    pause_count: Cell<usize>,
    play_count: Cell<usize>,

    fail_next_load: Cell<bool>,
    reject_next_play: RefCell<Option<String>>,
    hold_play: Cell<bool>,
    held_plays: RefCell<Vec<oneshot::Sender<Result<()>>>>,
}

impl FakeElement {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            paused: Cell::new(true),
            ready: Cell::new(ReadyState::HaveNothing),
            ready_on_attach: Cell::new(ReadyState::HaveEnoughData),
            src: RefCell::new(None),
            current_time: Cell::new(0.0),
            duration: Cell::new(f64::NAN),
            volume: Cell::new(1.0),
            muted: Cell::new(false),
            playback_rate: Cell::new(1.0),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            load_count: Cell::new(0),
            pause_count: Cell::new(0),
            play_count: Cell::new(0),
            fail_next_load: Cell::new(false),
            reject_next_play: RefCell::new(None),
            hold_play: Cell::new(false),
            held_plays: RefCell::new(Vec::new()),
        })
    }

    /// Ready state the element reaches right after a source is attached
    pub fn set_ready_on_attach(&self, state: ReadyState) {
        self.ready_on_attach.set(state);
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        self.ready.set(state);
    }

    pub fn set_duration(&self, seconds: f64) {
        self.duration.set(seconds);
    }

    /// Pretend playback is (or is not) running
    pub fn set_playing(&self, playing: bool) {
        self.paused.set(!playing);
    }

    /// Deliver a readiness signal to every listener
    pub fn emit(&self, signal: Readiness) {
        let mut listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (_, listener) in &mut listeners {
            listener(signal.clone());
        }
        let mut slot = self.listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }

    /// Buffer enough data and fire `canplay`
    pub fn make_ready(&self) {
        self.ready.set(ReadyState::HaveEnoughData);
        self.emit(Readiness::Ready);
    }

    pub fn fail_next_load(&self) {
        self.fail_next_load.set(true);
    }

    /// Make the next `play()` reject with `reason`
    pub fn reject_next_play(&self, reason: &str) {
        *self.reject_next_play.borrow_mut() = Some(reason.to_string());
    }

    /// Keep `play()` pending until [`FakeElement::release_play`]
    pub fn hold_play(&self, hold: bool) {
        self.hold_play.set(hold);
    }

    /// Settle every held `play()`
    pub fn release_play(&self, result: Result<()>) {
        let held = std::mem::take(&mut *self.held_plays.borrow_mut());
        if !held.is_empty() && result.is_ok() {
            self.paused.set(false);
        }
        for tx in held {
            let _ = tx.send(result.clone());
        }
    }

    pub fn src(&self) -> Option<String> {
        self.src.borrow().clone()
    }

    pub fn volume(&self) -> f64 {
        self.volume.get()
    }

    pub fn muted(&self) -> bool {
        self.muted.get()
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn load_count(&self) -> usize {
        self.load_count.get()
    }

    pub fn pause_count(&self) -> usize {
        self.pause_count.get()
    }

    pub fn play_count(&self) -> usize {
        self.play_count.get()
    }
}

impl MediaElement for FakeElement {
    fn play(&self) -> LocalBoxFuture<'static, Result<()>> {
        self.play_count.set(self.play_count.get() + 1);

        if let Some(reason) = self.reject_next_play.borrow_mut().take() {
            return future::ready(Err(PlayerError::PlayRejected(reason))).boxed_local();
        }
        if self.hold_play.get() {
            let (tx, rx) = oneshot::channel();
            self.held_plays.borrow_mut().push(tx);
            return async move {
                rx.await
                    .unwrap_or_else(|_| Err(PlayerError::PlayRejected("AbortError".to_string())))
            }
            .boxed_local();
        }

        self.paused.set(false);
        future::ready(Ok(())).boxed_local()
    }

    fn pause(&self) -> Result<()> {
        self.pause_count.set(self.pause_count.get() + 1);
        self.paused.set(true);
        Ok(())
    }

    fn load(&self) -> Result<()> {
        if self.fail_next_load.replace(false) {
            return Err(PlayerError::Media("load failed".to_string()));
        }
        self.load_count.set(self.load_count.get() + 1);
        self.current_time.set(0.0);
        self.duration.set(f64::NAN);
        self.paused.set(true);
        self.ready.set(ReadyState::HaveNothing);

        // Loading aborts pending play() calls
        for tx in std::mem::take(&mut *self.held_plays.borrow_mut()) {
            let _ = tx.send(Err(PlayerError::PlayRejected("AbortError".to_string())));
        }
        Ok(())
    }

    fn set_src(&self, url: Option<&str>) -> Result<()> {
        *self.src.borrow_mut() = url.map(str::to_string);
        if url.is_some() {
            self.ready.set(self.ready_on_attach.get());
            self.duration.set(FAKE_DURATION_SECS);
        }
        Ok(())
    }

    fn clear_src_object(&self) -> Result<()> {
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.paused.get()
    }

    fn ready_state(&self) -> ReadyState {
        self.ready.get()
    }

    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn set_current_time(&self, seconds: f64) {
        self.current_time.set(seconds);
    }

    fn duration(&self) -> f64 {
        self.duration.get()
    }

    fn set_volume(&self, volume: f64) {
        self.volume.set(volume);
    }

    fn set_muted(&self, muted: bool) {
        self.muted.set(muted);
    }

    fn set_playback_rate(&self, rate: f64) {
        self.playback_rate.set(rate);
    }

    fn add_readiness_listener(&self, listener: ReadinessListener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_readiness_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}

// ===== Object URLs =====

#[derive(Default)]
struct UrlState {
    created: Cell<usize>,
    revokes: RefCell<HashMap<String, usize>>,
    fail_create: Cell<bool>,
    fail_revoke: Cell<bool>,
}

/// Object URL factory handing out `blob:fake/<n>` URLs
#[derive(Clone, Default)]
pub struct FakeUrlFactory {
    state: Rc<UrlState>,
}

impl FakeUrlFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_create(&self) {
        self.state.fail_create.set(true);
    }

    pub fn fail_next_revoke(&self) {
        self.state.fail_revoke.set(true);
    }

    pub fn created_count(&self) -> usize {
        self.state.created.get()
    }

    /// How often `url` was revoked
    pub fn revoke_count(&self, url: &str) -> usize {
        self.state.revokes.borrow().get(url).copied().unwrap_or(0)
    }

    pub fn total_revokes(&self) -> usize {
        self.state.revokes.borrow().values().sum()
    }

    /// Whether any URL was revoked more than once
    pub fn any_double_revoke(&self) -> bool {
        self.state.revokes.borrow().values().any(|&n| n > 1)
    }
}

impl ObjectUrlFactory for FakeUrlFactory {
    fn create(&self, file: &LocalFile) -> Result<String> {
        if self.state.fail_create.replace(false) {
            return Err(PlayerError::Handle(format!("cannot open {}", file.name)));
        }
        let n = self.state.created.get() + 1;
        self.state.created.set(n);
        Ok(format!("blob:fake/{n}"))
    }

    fn revoke(&self, url: &str) -> Result<()> {
        *self
            .state
            .revokes
            .borrow_mut()
            .entry(url.to_string())
            .or_insert(0) += 1;
        if self.state.fail_revoke.replace(false) {
            return Err(PlayerError::Handle(format!("cannot revoke {url}")));
        }
        Ok(())
    }
}

// ===== Audio graph =====

#[derive(Default)]
struct AudioState {
    builds: Cell<usize>,
    last_shelf_hz: Cell<Option<f32>>,
    gain_db: Cell<Option<f32>>,
    closes: Cell<usize>,
    resumes: Cell<usize>,
    suspended: Cell<bool>,
    failing: bool,
}

/// Audio graph factory recording gain changes
#[derive(Clone, Default)]
pub struct FakeAudioFactory {
    state: Rc<AudioState>,
}

impl FakeAudioFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose builds always fail
    pub fn failing() -> Self {
        Self {
            state: Rc::new(AudioState {
                failing: true,
                ..AudioState::default()
            }),
        }
    }

    pub fn set_suspended(&self, suspended: bool) {
        self.state.suspended.set(suspended);
    }

    pub fn build_count(&self) -> usize {
        self.state.builds.get()
    }

    pub fn last_shelf_hz(&self) -> Option<f32> {
        self.state.last_shelf_hz.get()
    }

    /// Last gain written to the filter
    pub fn gain_db(&self) -> Option<f32> {
        self.state.gain_db.get()
    }

    pub fn close_count(&self) -> usize {
        self.state.closes.get()
    }

    pub fn resume_count(&self) -> usize {
        self.state.resumes.get()
    }
}

impl AudioGraphFactory for FakeAudioFactory {
    fn build(&self, low_shelf_hz: f32) -> Result<Rc<dyn AudioGraph>> {
        self.state.builds.set(self.state.builds.get() + 1);
        if self.state.failing {
            return Err(PlayerError::AudioGraph("no audio context".to_string()));
        }
        self.state.last_shelf_hz.set(Some(low_shelf_hz));
        Ok(Rc::new(FakeAudioGraph {
            state: Rc::clone(&self.state),
        }))
    }
}

struct FakeAudioGraph {
    state: Rc<AudioState>,
}

impl AudioGraph for FakeAudioGraph {
    fn set_bass_gain(&self, gain_db: f32) -> Result<()> {
        self.state.gain_db.set(Some(gain_db));
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.state.suspended.get()
    }

    fn resume(&self) -> LocalBoxFuture<'static, Result<()>> {
        self.state.resumes.set(self.state.resumes.get() + 1);
        self.state.suspended.set(false);
        future::ready(Ok(())).boxed_local()
    }

    fn close(&self) -> Result<()> {
        self.state.closes.set(self.state.closes.get() + 1);
        Ok(())
    }
}

// ===== Fullscreen =====

/// Fullscreen API that flips a flag
#[derive(Default)]
pub struct FakeFullscreen {
    active: Cell<bool>,
    requests: Cell<usize>,
    exits: Cell<usize>,
    fail_request: Cell<bool>,
}

impl FakeFullscreen {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn fail_next_request(&self) {
        self.fail_request.set(true);
    }

    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    pub fn exit_count(&self) -> usize {
        self.exits.get()
    }
}

impl FullscreenApi for FakeFullscreen {
    fn request(&self) -> LocalBoxFuture<'static, Result<()>> {
        self.requests.set(self.requests.get() + 1);
        if self.fail_request.replace(false) {
            return future::ready(Err(PlayerError::Fullscreen(
                "permission denied".to_string(),
            )))
            .boxed_local();
        }
        self.active.set(true);
        future::ready(Ok(())).boxed_local()
    }

    fn exit(&self) -> LocalBoxFuture<'static, Result<()>> {
        self.exits.set(self.exits.get() + 1);
        self.active.set(false);
        future::ready(Ok(())).boxed_local()
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Focus target counting focus calls
#[derive(Default)]
pub struct FakeFocus {
    focused: Cell<usize>,
}

impl FakeFocus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn focus_count(&self) -> usize {
        self.focused.get()
    }
}

impl FocusTarget for FakeFocus {
    fn focus(&self) {
        self.focused.set(self.focused.get() + 1);
    }
}

/// Deferrer that runs tasks only when asked
#[derive(Default)]
pub struct ManualDeferrer {
    tasks: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl ManualDeferrer {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn run_all(&self) {
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        for task in tasks {
            task();
        }
    }
}

impl Deferrer for ManualDeferrer {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        self.tasks.borrow_mut().push(task);
    }
}

// ===== Timer =====

/// Timer whose sleeps complete only on [`ManualTimer::fire_all`]
#[derive(Clone, Default)]
pub struct ManualTimer {
    sleeps: Rc<RefCell<Vec<(Duration, oneshot::Sender<()>)>>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations of sleeps not yet fired
    pub fn pending(&self) -> Vec<Duration> {
        self.sleeps
            .borrow()
            .iter()
            .filter(|(_, tx)| !tx.is_canceled())
            .map(|(d, _)| *d)
            .collect()
    }

    pub fn fire_all(&self) {
        for (_, tx) in std::mem::take(&mut *self.sleeps.borrow_mut()) {
            let _ = tx.send(());
        }
    }
}

impl Timer for ManualTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel();
        self.sleeps.borrow_mut().push((duration, tx));
        async move {
            if rx.await.is_err() {
                // Timer dropped: never fire
                future::pending::<()>().await;
            }
        }
        .boxed_local()
    }
}

// ===== Rig =====

/// Every fake wired together, with handles kept for assertions
pub struct Rig {
    pub element: Rc<FakeElement>,
    pub urls: FakeUrlFactory,
    pub audio: FakeAudioFactory,
    pub fullscreen: Rc<FakeFullscreen>,
    pub deferrer: Rc<ManualDeferrer>,
    pub timer: ManualTimer,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            element: FakeElement::new(),
            urls: FakeUrlFactory::new(),
            audio: FakeAudioFactory::new(),
            fullscreen: FakeFullscreen::new(),
            deferrer: ManualDeferrer::new(),
            timer: ManualTimer::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform {
            element: self.element.clone(),
            urls: Box::new(self.urls.clone()),
            audio: Box::new(self.audio.clone()),
            fullscreen: FullscreenCapability::Supported {
                variant: FullscreenVariant::Standard,
                api: self.fullscreen.clone(),
            },
            deferrer: self.deferrer.clone(),
            timer: Rc::new(self.timer.clone()),
        }
    }

    pub fn player(&self, config: PlayerConfig) -> Player {
        Player::new(config, self.platform())
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}
