//! Browser bindings
//!
//! `web-sys` implementations of the platform traits plus the
//! [`WasmVideoPlayer`] facade exported to JavaScript.

// wasm-bindgen expands to unsafe glue
#![allow(unsafe_code)]

mod audio;
mod bindings;
mod element;
mod fullscreen;
mod listener;
mod object_url;
mod timer;

pub use audio::WebAudioFactory;
pub use bindings::WasmVideoPlayer;
pub use element::WebVideoElement;
pub use fullscreen::{detect_fullscreen, ElementFocus};
pub use listener::DomListener;
pub use object_url::BlobUrlFactory;
pub use timer::{BrowserTimer, TimeoutDeferrer};

use wasm_bindgen::JsValue;

/// Best-effort message from a thrown JS value
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}
