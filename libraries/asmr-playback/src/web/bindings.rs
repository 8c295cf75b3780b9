//! JavaScript facade over [`PlayerHandle`]

use super::{
    detect_fullscreen, BlobUrlFactory, BrowserTimer, DomListener, ElementFocus,
    TimeoutDeferrer, WebAudioFactory, WebVideoElement,
};
use crate::{
    BassBoostConfig, BassPreset, Key, LocalFile, Platform, Player, PlayerConfig, PlayerHandle,
    RemoteItem,
};
use js_sys::{Array, Function, Promise};
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Document, File, HtmlElement, HtmlMediaElement, HtmlVideoElement, KeyboardEvent};

/// Options accepted by the constructor; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlayerOptions {
    initial_volume: Option<f64>,
    readiness_timeout_ms: Option<u64>,
    seek_step_secs: Option<f64>,
    auto_advance: Option<bool>,
    bass: Option<BassBoostConfig>,
}

impl PlayerOptions {
    fn into_config(self) -> PlayerConfig {
        let mut config = PlayerConfig::default();
        if let Some(volume) = self.initial_volume {
            config.initial_volume = volume;
        }
        if let Some(ms) = self.readiness_timeout_ms {
            config.readiness_timeout = Duration::from_millis(ms);
        }
        if let Some(step) = self.seek_step_secs {
            config.seek_step_secs = step;
        }
        if let Some(auto_advance) = self.auto_advance {
            config.auto_advance = auto_advance;
        }
        if let Some(bass) = self.bass {
            config.bass = bass;
        }
        config
    }
}

/// Forwards drained player events to the JS callback
#[derive(Clone)]
struct EventSink {
    handle: PlayerHandle,
    callback: Rc<RefCell<Option<Function>>>,
}

impl EventSink {
    fn flush(&self) {
        let events = self.handle.with(Player::drain_events);
        let Some(callback) = self.callback.borrow().clone() else {
            return;
        };
        for event in events {
            let value = serde_wasm_bindgen::to_value(&event).unwrap_or(JsValue::NULL);
            callback.call1(&JsValue::NULL, &value).ok();
        }
    }
}

/// Browser video player
#[wasm_bindgen]
pub struct WasmVideoPlayer {
    handle: PlayerHandle,
    sink: EventSink,
    document: Document,
    listeners: Vec<DomListener>,
}

#[wasm_bindgen]
impl WasmVideoPlayer {
    /// Create a player driving `video`; `container` is what goes fullscreen
    #[wasm_bindgen(constructor)]
    pub fn new(
        video: HtmlVideoElement,
        container: HtmlElement,
        options: JsValue,
    ) -> Result<WasmVideoPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let options: PlayerOptions = if options.is_undefined() || options.is_null() {
            PlayerOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let media: &HtmlMediaElement = video.as_ref();
        let fullscreen = detect_fullscreen(&container, &document);
        let variant = match &fullscreen {
            crate::FullscreenCapability::Supported { variant, .. } => Some(*variant),
            crate::FullscreenCapability::Unsupported => None,
        };

        let platform = Platform {
            element: Rc::new(WebVideoElement::new(video.clone())),
            urls: Box::new(BlobUrlFactory),
            audio: Box::new(WebAudioFactory::new(media.clone())),
            fullscreen,
            deferrer: Rc::new(TimeoutDeferrer),
            timer: Rc::new(BrowserTimer),
        };

        let handle = PlayerHandle::new(Player::new(options.into_config(), platform));
        let navigator = window.navigator();
        handle.with(|player| player.on_connectivity_change(navigator.on_line()));
        let sink = EventSink {
            handle: handle.clone(),
            callback: Rc::new(RefCell::new(None)),
        };

        let mut listeners = Vec::new();
        for event in ["timeupdate", "loadedmetadata"] {
            let sink = sink.clone();
            listeners.push(DomListener::new(&video, event, move |_| {
                sink.handle.with(Player::handle_time_update);
                sink.flush();
            })?);
        }

        let ended_sink = sink.clone();
        listeners.push(DomListener::new(&video, "ended", move |_| {
            let sink = ended_sink.clone();
            spawn_local(async move {
                sink.handle.on_media_ended().await;
                sink.flush();
            });
        })?);

        for event in ["online", "offline"] {
            let sink = sink.clone();
            let navigator = navigator.clone();
            listeners.push(DomListener::new(&window, event, move |_| {
                sink.handle
                    .with(|player| player.on_connectivity_change(navigator.on_line()));
                sink.flush();
            })?);
        }

        if let Some(variant) = variant {
            let change_sink = sink.clone();
            listeners.push(DomListener::new(&document, variant.change_event(), move |_| {
                change_sink.handle.with(Player::on_fullscreen_change);
                change_sink.flush();
            })?);

            let error_sink = sink.clone();
            listeners.push(DomListener::new(&document, variant.error_event(), move |_| {
                error_sink.handle.with(|player| player.on_fullscreen_error(None));
                error_sink.flush();
            })?);
        }

        Ok(Self {
            handle,
            sink,
            document,
            listeners,
        })
    }

    /// Register the event callback; receives one object per event
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        *self.sink.callback.borrow_mut() = Some(callback);
    }

    // ===== Queue =====

    /// Append local files; returns how many were accepted
    #[wasm_bindgen(js_name = addFiles)]
    pub fn add_files(&self, files: Array) -> usize {
        let files = files
            .iter()
            .filter_map(|value| value.dyn_into::<File>().ok())
            .map(local_file)
            .collect();
        let added = self.handle.with(|player| player.add_local_files(files));
        self.sink.flush();
        added
    }

    /// Append resolved remote videos (`RemoteItem` objects)
    #[wasm_bindgen(js_name = addRemoteItems)]
    pub fn add_remote_items(&self, items: JsValue) -> Result<usize, JsValue> {
        let items: Vec<RemoteItem> = serde_wasm_bindgen::from_value(items)?;
        let added = self.handle.with(|player| player.add_remote_items(items));
        self.sink.flush();
        Ok(added)
    }

    /// Play a single file outside the queue
    #[wasm_bindgen(js_name = loadFile)]
    pub fn load_file(&self, file: File) -> bool {
        let loaded = self.handle.with(|player| player.load_file(local_file(file)));
        self.sink.flush();
        loaded
    }

    #[wasm_bindgen(js_name = removeAt)]
    pub fn remove_at(&self, index: usize) -> bool {
        let removed = self.handle.with(|player| player.remove_at(index));
        self.sink.flush();
        removed
    }

    #[wasm_bindgen(js_name = clearQueue)]
    pub fn clear_queue(&self) {
        self.handle.with(Player::clear_queue);
        self.sink.flush();
    }

    /// Current queue as an array of items
    #[wasm_bindgen(js_name = getQueue)]
    pub fn get_queue(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.handle.borrow().queue().items()).unwrap_or(JsValue::NULL)
    }

    /// Active queue index, or -1
    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> i32 {
        self.handle
            .borrow()
            .queue()
            .current_index()
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(-1)
    }

    // ===== Playback =====

    /// Resolves to whether playback started
    #[wasm_bindgen(js_name = playIndex)]
    pub fn play_index(&self, index: usize) -> Promise {
        let sink = self.sink.clone();
        future_to_promise(async move {
            let playing = sink.handle.play_index(index).await;
            sink.flush();
            Ok(JsValue::from_bool(playing))
        })
    }

    pub fn next(&self) -> Promise {
        let sink = self.sink.clone();
        future_to_promise(async move {
            let playing = sink.handle.next().await;
            sink.flush();
            Ok(JsValue::from_bool(playing))
        })
    }

    pub fn prev(&self) -> Promise {
        let sink = self.sink.clone();
        future_to_promise(async move {
            let playing = sink.handle.prev().await;
            sink.flush();
            Ok(JsValue::from_bool(playing))
        })
    }

    /// Resolves to whether the player is playing afterwards
    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) -> Promise {
        let sink = self.sink.clone();
        future_to_promise(async move {
            let playing = sink.handle.toggle_play().await;
            sink.flush();
            Ok(JsValue::from_bool(playing))
        })
    }

    pub fn pause(&self) {
        self.handle.with(Player::pause);
        self.sink.flush();
    }

    /// Volume in percent (0-100)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, percent: f64) {
        self.handle.with(|player| player.handle_volume_change(percent));
        self.sink.flush();
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.handle.with(Player::toggle_mute);
        self.sink.flush();
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&self, rate: f64) -> bool {
        let applied = self.handle.with(|player| player.set_speed(rate));
        self.sink.flush();
        applied
    }

    /// Seek to a percentage of the duration
    pub fn seek(&self, percent: f64) {
        self.handle.with(|player| player.handle_seek(percent));
        self.sink.flush();
    }

    /// Seek relative to the current time, in seconds
    #[wasm_bindgen(js_name = seekBy)]
    pub fn seek_by(&self, delta_secs: f64) {
        self.handle.with(|player| player.handle_seek_seconds(delta_secs));
        self.sink.flush();
    }

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.handle.borrow().state()).unwrap_or(JsValue::NULL)
    }

    // ===== Bass boost =====

    /// Select a preset by name ("5", "10", "20", "30" or "Custom")
    #[wasm_bindgen(js_name = selectPreset)]
    pub fn select_preset(&self, name: &str) -> bool {
        let Some(preset) = BassPreset::from_name(name) else {
            return false;
        };
        self.handle.with(|player| player.select_bass_preset(preset));
        self.sink.flush();
        true
    }

    #[wasm_bindgen(js_name = setCustomGain)]
    pub fn set_custom_gain(&self, gain_db: f32) {
        self.handle.with(|player| player.set_custom_bass_gain(gain_db));
        self.sink.flush();
    }

    #[wasm_bindgen(js_name = setBassEnabled)]
    pub fn set_bass_enabled(&self, enabled: bool) {
        self.handle.with(|player| player.set_bass_enabled(enabled));
        self.sink.flush();
    }

    #[wasm_bindgen(js_name = getBass)]
    pub fn get_bass(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.handle.borrow().bass()).unwrap_or(JsValue::NULL)
    }

    // ===== Fullscreen =====

    /// `trigger` gets focus back when fullscreen ends
    #[wasm_bindgen(js_name = requestFullscreen)]
    pub fn request_fullscreen(&self, trigger: Option<HtmlElement>) -> Promise {
        let sink = self.sink.clone();
        future_to_promise(async move {
            sink.handle.request_fullscreen(focus_target(trigger)).await;
            sink.flush();
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = exitFullscreen)]
    pub fn exit_fullscreen(&self) -> Promise {
        let sink = self.sink.clone();
        future_to_promise(async move {
            sink.handle.exit_fullscreen().await;
            sink.flush();
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self, trigger: Option<HtmlElement>) -> Promise {
        let sink = self.sink.clone();
        future_to_promise(async move {
            sink.handle.toggle_fullscreen(focus_target(trigger)).await;
            sink.flush();
            Ok(JsValue::UNDEFINED)
        })
    }

    // ===== Keyboard =====

    /// Handle a `keydown`; returns true when the player consumed it
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, event: KeyboardEvent) -> bool {
        let key = Key::from_dom_key(&event.key());
        let command = self
            .handle
            .borrow()
            .key_command(key, focus_in_text_field(&self.document));
        let Some(command) = command else {
            return false;
        };

        event.prevent_default();
        let sink = self.sink.clone();
        spawn_local(async move {
            sink.handle.run_command(command).await;
            sink.flush();
        });
        true
    }

    // ===== Lifecycle =====

    /// Detach DOM listeners, release every object URL and close audio
    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.handle.with(Player::teardown);
        self.sink.flush();
    }
}

fn local_file(file: File) -> LocalFile {
    // File sizes stay well below 2^53
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let size = file.size() as u64;
    LocalFile::new(file.name(), file.type_(), size).with_payload(file)
}

fn focus_target(trigger: Option<HtmlElement>) -> Option<Rc<dyn crate::FocusTarget>> {
    trigger.map(|element| Rc::new(ElementFocus(element)) as Rc<dyn crate::FocusTarget>)
}

fn focus_in_text_field(document: &Document) -> bool {
    let Some(active) = document.active_element() else {
        return false;
    };
    let content_editable = active
        .dyn_ref::<HtmlElement>()
        .is_some_and(HtmlElement::is_content_editable);
    let input_type = active.get_attribute("type");
    crate::keys::is_text_entry(&active.tag_name(), input_type.as_deref(), content_editable)
}
