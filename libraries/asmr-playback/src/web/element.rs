//! `HTMLVideoElement` as a [`MediaElement`]

use super::{js_error_message, listener::DomListener};
use crate::error::{PlayerError, Result};
use crate::media::{ListenerId, MediaElement, ReadinessListener, ReadyState, Readiness};
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlMediaElement, HtmlVideoElement};

pub struct WebVideoElement {
    element: HtmlVideoElement,
    readiness: RefCell<HashMap<ListenerId, [DomListener; 2]>>,
    next_id: Cell<u64>,
}

impl WebVideoElement {
    pub fn new(element: HtmlVideoElement) -> Self {
        Self {
            element,
            readiness: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn element(&self) -> &HtmlVideoElement {
        &self.element
    }
}

fn media_error(element: &HtmlMediaElement) -> String {
    element
        .error()
        .map(|e| {
            let message = e.message();
            if message.is_empty() {
                format!("media error code {}", e.code())
            } else {
                message
            }
        })
        .unwrap_or_else(|| "media error".to_string())
}

impl MediaElement for WebVideoElement {
    fn play(&self) -> LocalBoxFuture<'static, Result<()>> {
        match self.element.play() {
            Ok(promise) => async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| PlayerError::PlayRejected(js_error_message(&e)))
            }
            .boxed_local(),
            Err(e) => future::ready(Err(PlayerError::PlayRejected(js_error_message(&e)))).boxed_local(),
        }
    }

    fn pause(&self) -> Result<()> {
        self.element
            .pause()
            .map_err(|e| PlayerError::Media(js_error_message(&e)))
    }

    fn load(&self) -> Result<()> {
        self.element.load();
        Ok(())
    }

    fn set_src(&self, url: Option<&str>) -> Result<()> {
        match url {
            Some(url) => {
                self.element.set_src(url);
                Ok(())
            }
            // An empty src fires an error event, remove the attribute instead
            None => self
                .element
                .remove_attribute("src")
                .map_err(|e| PlayerError::Media(js_error_message(&e))),
        }
    }

    fn clear_src_object(&self) -> Result<()> {
        self.element.set_src_object(None);
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_dom(self.element.ready_state())
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn set_volume(&self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn set_muted(&self, muted: bool) {
        self.element.set_muted(muted);
    }

    fn set_playback_rate(&self, rate: f64) {
        self.element.set_playback_rate(rate);
    }

    fn add_readiness_listener(&self, listener: ReadinessListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let listener = Rc::new(RefCell::new(listener));
        let on_ready = Rc::clone(&listener);
        let on_error = listener;
        let source = self.element.clone();

        let listeners = DomListener::new(&self.element, "canplay", move |_| {
            (&mut **on_ready.borrow_mut())(Readiness::Ready);
        })
        .and_then(|canplay| {
            let error = DomListener::new(&self.element, "error", move |_| {
                let message = media_error(&source);
                (&mut **on_error.borrow_mut())(Readiness::Failed(message));
            })?;
            Ok([canplay, error])
        });

        match listeners {
            Ok(pair) => {
                self.readiness.borrow_mut().insert(id, pair);
            }
            Err(e) => {
                tracing::error!(error = %js_error_message(&e), "Failed to attach readiness listeners");
            }
        }
        id
    }

    fn remove_readiness_listener(&self, id: ListenerId) {
        // Dropping the pair detaches both DOM listeners
        self.readiness.borrow_mut().remove(&id);
    }
}
