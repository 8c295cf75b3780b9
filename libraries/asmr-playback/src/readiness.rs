//! Waiting for the media element to buffer
//!
//! [`ReadinessWait`] resolves on the first of: `canplay`, `error`, or the
//! timeout. The listener is detached on every exit path, including when the
//! future is dropped before completion.

use crate::error::{PlayerError, Result};
use crate::media::{ListenerGuard, MediaElement, Readiness};
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

/// Platform timer
pub trait Timer {
    /// Future completing after `duration`
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Future for the element's readiness, bounded by a timeout
pub struct ReadinessWait {
    signal: oneshot::Receiver<Readiness>,
    timeout: LocalBoxFuture<'static, ()>,
    timeout_after: Duration,
    guard: ListenerGuard,
}

impl ReadinessWait {
    pub fn new(element: Rc<dyn MediaElement>, timer: &dyn Timer, timeout: Duration) -> Self {
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let id = element.add_readiness_listener(Box::new(move |signal| {
            if let Some(tx) = tx.take() {
                // Receiver gone means the wait was abandoned
                let _ = tx.send(signal);
            }
        }));

        Self {
            signal: rx,
            timeout: timer.sleep(timeout),
            timeout_after: timeout,
            guard: ListenerGuard::new(element, id),
        }
    }
}

impl Future for ReadinessWait {
    type Output = Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        let outcome = match Pin::new(&mut this.signal).poll(cx) {
            Poll::Ready(Ok(Readiness::Ready)) => Some(Ok(())),
            Poll::Ready(Ok(Readiness::Failed(message))) => {
                Some(Err(PlayerError::ReadinessFailed(message)))
            }
            Poll::Ready(Err(oneshot::Canceled)) => Some(Err(PlayerError::ReadinessFailed(
                "readiness listener removed".to_string(),
            ))),
            Poll::Pending => None,
        };

        let outcome = outcome.or_else(|| {
            this.timeout
                .as_mut()
                .poll(cx)
                .is_ready()
                .then_some(Err(PlayerError::ReadinessTimeout(this.timeout_after)))
        });

        match outcome {
            Some(result) => {
                this.guard.detach();
                Poll::Ready(result)
            }
            None => Poll::Pending,
        }
    }
}
