use super::js_error_message;
use crate::error::{PlayerError, Result};
use crate::fullscreen::{FocusTarget, FullscreenApi, FullscreenCapability, FullscreenVariant};
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use js_sys::{Function, Promise, Reflect};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement};

const DETECTION_ORDER: [FullscreenVariant; 4] = [
    FullscreenVariant::Standard,
    FullscreenVariant::Webkit,
    FullscreenVariant::Moz,
    FullscreenVariant::Ms,
];

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

/// Pick the first API flavour the container supports
pub fn detect_fullscreen(container: &HtmlElement, document: &Document) -> FullscreenCapability {
    let variant = DETECTION_ORDER
        .into_iter()
        .find(|variant| method(container.as_ref(), variant.request_method()).is_some());

    match variant {
        Some(variant) => {
            tracing::debug!(?variant, "Fullscreen API detected");
            FullscreenCapability::Supported {
                variant,
                api: Rc::new(WebFullscreen {
                    variant,
                    container: container.clone(),
                    document: document.clone(),
                }),
            }
        }
        None => FullscreenCapability::Unsupported,
    }
}

struct WebFullscreen {
    variant: FullscreenVariant,
    container: HtmlElement,
    document: Document,
}

/// Call `name` on `target`, awaiting the result if it is a promise
///
/// Older prefixed APIs return `undefined` instead of a promise.
fn invoke(target: &JsValue, name: &str) -> LocalBoxFuture<'static, Result<()>> {
    let Some(function) = method(target, name) else {
        return future::ready(Err(PlayerError::Fullscreen(format!("{name} is not available"))))
            .boxed_local();
    };
    match function.call0(target) {
        Ok(value) => match value.dyn_into::<Promise>() {
            Ok(promise) => async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| PlayerError::Fullscreen(js_error_message(&e)))
            }
            .boxed_local(),
            Err(_) => future::ready(Ok(())).boxed_local(),
        },
        Err(e) => future::ready(Err(PlayerError::Fullscreen(js_error_message(&e)))).boxed_local(),
    }
}

impl FullscreenApi for WebFullscreen {
    fn request(&self) -> LocalBoxFuture<'static, Result<()>> {
        invoke(self.container.as_ref(), self.variant.request_method())
    }

    fn exit(&self) -> LocalBoxFuture<'static, Result<()>> {
        invoke(self.document.as_ref(), self.variant.exit_method())
    }

    fn is_active(&self) -> bool {
        Reflect::get(
            self.document.as_ref(),
            &JsValue::from_str(self.variant.element_property()),
        )
        .map(|element| !element.is_null() && !element.is_undefined())
        .unwrap_or(false)
    }
}

/// Gives focus back to a DOM element
pub struct ElementFocus(pub HtmlElement);

impl FocusTarget for ElementFocus {
    fn focus(&self) {
        if let Err(e) = self.0.focus() {
            tracing::debug!(error = %js_error_message(&e), "Could not restore focus");
        }
    }
}
