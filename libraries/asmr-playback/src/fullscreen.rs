//! Fullscreen coordination
//!
//! Vendor detection happens once, when the platform builds the
//! [`FullscreenCapability`]. After that every request goes through the same
//! API object regardless of prefix. The coordinator remembers which control
//! triggered fullscreen so keyboard focus can return to it on exit.

use crate::error::Result;
use futures::future::LocalBoxFuture;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Which fullscreen API flavour the platform exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenVariant {
    Standard,
    Webkit,
    Moz,
    Ms,
}

impl FullscreenVariant {
    /// Name of the request method for this variant
    pub fn request_method(self) -> &'static str {
        match self {
            FullscreenVariant::Standard => "requestFullscreen",
            FullscreenVariant::Webkit => "webkitRequestFullscreen",
            FullscreenVariant::Moz => "mozRequestFullScreen",
            FullscreenVariant::Ms => "msRequestFullscreen",
        }
    }

    /// Name of the exit method for this variant
    pub fn exit_method(self) -> &'static str {
        match self {
            FullscreenVariant::Standard => "exitFullscreen",
            FullscreenVariant::Webkit => "webkitExitFullscreen",
            FullscreenVariant::Moz => "mozCancelFullScreen",
            FullscreenVariant::Ms => "msExitFullscreen",
        }
    }

    /// Document property holding the fullscreen element
    pub fn element_property(self) -> &'static str {
        match self {
            FullscreenVariant::Standard => "fullscreenElement",
            FullscreenVariant::Webkit => "webkitFullscreenElement",
            FullscreenVariant::Moz => "mozFullScreenElement",
            FullscreenVariant::Ms => "msFullscreenElement",
        }
    }

    /// Document event fired when fullscreen state changes
    pub fn change_event(self) -> &'static str {
        match self {
            FullscreenVariant::Standard => "fullscreenchange",
            FullscreenVariant::Webkit => "webkitfullscreenchange",
            FullscreenVariant::Moz => "mozfullscreenchange",
            FullscreenVariant::Ms => "MSFullscreenChange",
        }
    }

    pub fn error_event(self) -> &'static str {
        match self {
            FullscreenVariant::Standard => "fullscreenerror",
            FullscreenVariant::Webkit => "webkitfullscreenerror",
            FullscreenVariant::Moz => "mozfullscreenerror",
            FullscreenVariant::Ms => "MSFullscreenError",
        }
    }
}

/// Resolved fullscreen API for the player container
pub trait FullscreenApi {
    fn request(&self) -> LocalBoxFuture<'static, Result<()>>;

    fn exit(&self) -> LocalBoxFuture<'static, Result<()>>;

    /// Whether the container is currently fullscreen
    fn is_active(&self) -> bool;
}

/// Result of vendor detection
#[derive(Clone)]
pub enum FullscreenCapability {
    Supported {
        variant: FullscreenVariant,
        api: Rc<dyn FullscreenApi>,
    },
    Unsupported,
}

impl fmt::Debug for FullscreenCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FullscreenCapability::Supported { variant, .. } => {
                f.debug_tuple("Supported").field(variant).finish()
            }
            FullscreenCapability::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// Something that can take keyboard focus back
pub trait FocusTarget {
    fn focus(&self);
}

/// Runs a task after the current event has been handled
///
/// Focus restoration waits for layout to settle after leaving fullscreen.
pub trait Deferrer {
    fn defer(&self, task: Box<dyn FnOnce()>);
}

/// Tracks fullscreen state for one player container
pub struct FullscreenCoordinator {
    capability: FullscreenCapability,
    deferrer: Rc<dyn Deferrer>,
    trigger: Option<Rc<dyn FocusTarget>>,
    is_fullscreen: bool,
}

impl FullscreenCoordinator {
    pub fn new(capability: FullscreenCapability, deferrer: Rc<dyn Deferrer>) -> Self {
        debug!(capability = ?capability, "Fullscreen capability resolved");
        Self {
            capability,
            deferrer,
            trigger: None,
            is_fullscreen: false,
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn variant(&self) -> Option<FullscreenVariant> {
        match &self.capability {
            FullscreenCapability::Supported { variant, .. } => Some(*variant),
            FullscreenCapability::Unsupported => None,
        }
    }

    /// Start a fullscreen request; the returned future must be awaited
    ///
    /// `trigger` receives focus again when fullscreen ends.
    pub fn request(
        &mut self,
        trigger: Option<Rc<dyn FocusTarget>>,
    ) -> Option<LocalBoxFuture<'static, Result<()>>> {
        let FullscreenCapability::Supported { api, .. } = &self.capability else {
            warn!("Fullscreen is not supported on this platform");
            return None;
        };
        if trigger.is_some() {
            self.trigger = trigger;
        }
        Some(api.request())
    }

    /// Start leaving fullscreen
    pub fn exit(&mut self) -> Option<LocalBoxFuture<'static, Result<()>>> {
        let FullscreenCapability::Supported { api, .. } = &self.capability else {
            warn!("Fullscreen is not supported on this platform");
            return None;
        };
        if !self.is_fullscreen && !api.is_active() {
            debug!("Not in fullscreen, nothing to exit");
            return None;
        }
        Some(api.exit())
    }

    pub fn toggle(
        &mut self,
        trigger: Option<Rc<dyn FocusTarget>>,
    ) -> Option<LocalBoxFuture<'static, Result<()>>> {
        if self.is_fullscreen {
            self.exit()
        } else {
            self.request(trigger)
        }
    }

    /// `fullscreenchange` handler; returns the new state
    pub fn on_change(&mut self) -> bool {
        let active = match &self.capability {
            FullscreenCapability::Supported { api, .. } => api.is_active(),
            FullscreenCapability::Unsupported => false,
        };
        let left = self.is_fullscreen && !active;
        self.is_fullscreen = active;
        if left {
            self.restore_focus();
        }
        active
    }

    /// `fullscreenerror` handler, also used for rejected requests
    pub fn on_error(&mut self) {
        self.is_fullscreen = false;
        self.restore_focus();
    }

    fn restore_focus(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            self.deferrer.defer(Box::new(move || trigger.focus()));
        }
    }
}
