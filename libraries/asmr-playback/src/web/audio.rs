//! Web Audio bass boost graph

use super::js_error_message;
use crate::bass::{AudioGraph, AudioGraphFactory};
use crate::error::{PlayerError, Result};
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AudioContext, AudioContextState, BiquadFilterNode, BiquadFilterType, HtmlMediaElement,
    MediaElementAudioSourceNode,
};

fn graph_error(e: &JsValue) -> PlayerError {
    PlayerError::AudioGraph(js_error_message(e))
}

/// Builds `element ─► lowshelf ─► destination` in a fresh `AudioContext`
pub struct WebAudioFactory {
    element: HtmlMediaElement,
}

impl WebAudioFactory {
    pub fn new(element: HtmlMediaElement) -> Self {
        Self { element }
    }
}

impl AudioGraphFactory for WebAudioFactory {
    fn build(&self, low_shelf_hz: f32) -> Result<Rc<dyn AudioGraph>> {
        let context = AudioContext::new().map_err(|e| graph_error(&e))?;
        let source = context
            .create_media_element_source(&self.element)
            .map_err(|e| graph_error(&e))?;

        let filter = context.create_biquad_filter().map_err(|e| graph_error(&e))?;
        filter.set_type(BiquadFilterType::Lowshelf);
        filter.frequency().set_value(low_shelf_hz);

        source
            .connect_with_audio_node(&filter)
            .map_err(|e| graph_error(&e))?;
        filter
            .connect_with_audio_node(&context.destination())
            .map_err(|e| graph_error(&e))?;

        Ok(Rc::new(WebAudioGraph {
            context,
            _source: source,
            filter,
        }))
    }
}

struct WebAudioGraph {
    context: AudioContext,
    // Kept so the node outlives the graph
    _source: MediaElementAudioSourceNode,
    filter: BiquadFilterNode,
}

impl AudioGraph for WebAudioGraph {
    fn set_bass_gain(&self, gain_db: f32) -> Result<()> {
        self.filter.gain().set_value(gain_db);
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.context.state() == AudioContextState::Suspended
    }

    fn resume(&self) -> LocalBoxFuture<'static, Result<()>> {
        match self.context.resume() {
            Ok(promise) => async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| graph_error(&e))
            }
            .boxed_local(),
            Err(e) => future::ready(Err(graph_error(&e))).boxed_local(),
        }
    }

    fn close(&self) -> Result<()> {
        // The returned promise settles on its own
        self.context.close().map(|_| ()).map_err(|e| graph_error(&e))
    }
}
