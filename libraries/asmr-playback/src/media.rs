//! Platform-agnostic media element trait
//!
//! Abstracts the video element for different platforms (browser DOM, test fakes).

use crate::error::Result;
use futures::future::LocalBoxFuture;
use std::rc::Rc;

/// Buffering state of the element, ordered like `HTMLMediaElement.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// Map the numeric DOM value (0-4)
    pub fn from_dom(value: u16) -> Self {
        match value {
            0 => ReadyState::HaveNothing,
            1 => ReadyState::HaveMetadata,
            2 => ReadyState::HaveCurrentData,
            3 => ReadyState::HaveFutureData,
            _ => ReadyState::HaveEnoughData,
        }
    }

    /// Enough data buffered to start playing without an immediate stall
    pub fn can_play(self) -> bool {
        self >= ReadyState::HaveFutureData
    }
}

/// Signal delivered to readiness listeners
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    /// `canplay` fired
    Ready,
    /// `error` fired
    Failed(String),
}

/// Token for a registered readiness listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked by the element on readiness events
pub type ReadinessListener = Box<dyn FnMut(Readiness)>;

/// Platform video element
///
/// Methods take `&self`: the element is a shared DOM object and
/// implementors use interior mutability, like the DOM does.
/// Fallible operations return `Err` where the platform can throw.
pub trait MediaElement {
    /// Start playback; resolves when the platform accepted it
    fn play(&self) -> LocalBoxFuture<'static, Result<()>>;

    fn pause(&self) -> Result<()>;

    /// Reset the element's internal state (`load()`)
    fn load(&self) -> Result<()>;

    /// Set or clear the declarative source
    fn set_src(&self, url: Option<&str>) -> Result<()>;

    /// Drop any live-stream object (`srcObject = null`)
    fn clear_src_object(&self) -> Result<()>;

    fn is_paused(&self) -> bool;

    fn ready_state(&self) -> ReadyState;

    /// Current position in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64);

    /// Duration in seconds; NaN while unknown, infinite for live streams
    fn duration(&self) -> f64;

    fn set_volume(&self, volume: f64);

    fn set_muted(&self, muted: bool);

    fn set_playback_rate(&self, rate: f64);

    /// Register for the next readiness events (`canplay` / `error`)
    fn add_readiness_listener(&self, listener: ReadinessListener) -> ListenerId;

    fn remove_readiness_listener(&self, id: ListenerId);
}

/// Removes a readiness listener when dropped
///
/// Held by [`crate::readiness::ReadinessWait`] so every exit path
/// (ready, error, timeout, cancellation) detaches the listener.
pub struct ListenerGuard {
    element: Rc<dyn MediaElement>,
    id: Option<ListenerId>,
}

impl ListenerGuard {
    pub fn new(element: Rc<dyn MediaElement>, id: ListenerId) -> Self {
        Self {
            element,
            id: Some(id),
        }
    }

    /// Detach now instead of on drop
    pub fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.element.remove_readiness_listener(id);
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeElement;

    #[test]
    fn ready_state_ordering() {
        assert!(!ReadyState::HaveNothing.can_play());
        assert!(!ReadyState::HaveCurrentData.can_play());
        assert!(ReadyState::HaveFutureData.can_play());
        assert!(ReadyState::HaveEnoughData.can_play());
        assert_eq!(ReadyState::from_dom(2), ReadyState::HaveCurrentData);
        assert_eq!(ReadyState::from_dom(9), ReadyState::HaveEnoughData);
    }

    #[test]
    fn guard_detaches_once() {
        let element = FakeElement::new();
        let shared: Rc<dyn MediaElement> = element.clone();
        let id = shared.add_readiness_listener(Box::new(|_| {}));
        assert_eq!(element.listener_count(), 1);

        let mut guard = ListenerGuard::new(shared, id);
        guard.detach();
        assert_eq!(element.listener_count(), 0);

        drop(guard);
        assert_eq!(element.listener_count(), 0);
    }
}
