use crate::fullscreen::Deferrer;
use crate::readiness::Timer;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn set_timeout(callback: impl FnOnce() + 'static, millis: i32) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let callback = Closure::once_into_js(callback);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        .is_ok()
}

/// `setTimeout`-backed timer
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let scheduled = set_timeout(
            move || {
                let _ = tx.send(());
            },
            millis,
        );
        async move {
            if !scheduled || rx.await.is_err() {
                // No timer available: never time out
                futures::future::pending::<()>().await;
            }
        }
        .boxed_local()
    }
}

/// Runs deferred tasks on the next macrotask
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeoutDeferrer;

impl Deferrer for TimeoutDeferrer {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        if !set_timeout(task, 0) {
            tracing::warn!("No window available, deferred task dropped");
        }
    }
}
