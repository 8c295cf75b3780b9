//! Source switching
//!
//! Swaps the stream loaded into the media element:
//!
//! 1. pause if playing
//! 2. detach (`src` and `srcObject` cleared)
//! 3. `load()` to reset the element
//! 4. release the previous local handle unless something still references it
//! 5. attach the new URL, if any
//!
//! The caller resets its transient playback state afterwards. A failure at
//! any step leaves the element with no active source, and the `switching`
//! guard is cleared on every path.

use crate::error::{PlayerError, Result};
use crate::handles::{is_local_handle, HandleRegistry};
use crate::media::MediaElement;
use tracing::{debug, error, warn};

/// Serialises source changes on one media element
#[derive(Debug, Default)]
pub struct SourceSwitcher {
    switching: bool,
    active: Option<String>,
    generation: u64,
}

impl SourceSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL currently attached to the element
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_switching(&self) -> bool {
        self.switching
    }

    /// Bumped after every switch, successful or not
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch the element to `new_url` (or to nothing)
    ///
    /// `still_referenced` reports whether a URL is held elsewhere (the
    /// queue); such handles are not released.
    pub fn switch(
        &mut self,
        element: &dyn MediaElement,
        handles: &mut HandleRegistry,
        new_url: Option<&str>,
        still_referenced: impl Fn(&str) -> bool,
    ) -> Result<()> {
        if self.switching {
            warn!(url = ?new_url, "Source switch already in progress, dropping request");
            return Err(PlayerError::SwitchInProgress);
        }
        self.switching = true;

        let previous = self.active.take();
        let result = Self::run(
            element,
            handles,
            previous.as_deref(),
            new_url,
            &still_referenced,
        );

        match &result {
            Ok(()) => {
                self.active = new_url.map(str::to_string);
                debug!(from = ?previous, to = ?new_url, "Source switched");
            }
            Err(e) => {
                error!(from = ?previous, to = ?new_url, error = %e, "Source switch failed");
                self.active = None;
            }
        }

        self.generation += 1;
        self.switching = false;
        result
    }

    fn run(
        element: &dyn MediaElement,
        handles: &mut HandleRegistry,
        previous: Option<&str>,
        new_url: Option<&str>,
        still_referenced: &dyn Fn(&str) -> bool,
    ) -> Result<()> {
        if !element.is_paused() {
            element.pause()?;
        }

        element.set_src(None)?;
        element.clear_src_object()?;
        element.load()?;

        if let Some(prev) = previous {
            if is_local_handle(prev) && Some(prev) != new_url && !still_referenced(prev) {
                handles.release(prev);
            }
        }

        if let Some(url) = new_url {
            element.set_src(Some(url))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeElement, FakeUrlFactory};
    use crate::types::LocalFile;

    fn setup() -> (SourceSwitcher, std::rc::Rc<FakeElement>, HandleRegistry, FakeUrlFactory) {
        let factory = FakeUrlFactory::new();
        (
            SourceSwitcher::new(),
            FakeElement::new(),
            HandleRegistry::new(Box::new(factory.clone())),
            factory,
        )
    }

    #[test]
    fn switch_attaches_and_bumps_generation() {
        let (mut switcher, element, mut handles, _) = setup();

        switcher
            .switch(element.as_ref(), &mut handles, Some("https://a"), |_| false)
            .unwrap();

        assert_eq!(switcher.active(), Some("https://a"));
        assert_eq!(element.src().as_deref(), Some("https://a"));
        assert_eq!(element.load_count(), 1);
        assert_eq!(switcher.generation(), 1);
        assert!(!switcher.is_switching());
    }

    #[test]
    fn switch_pauses_playing_element() {
        let (mut switcher, element, mut handles, _) = setup();
        element.set_playing(true);

        switcher
            .switch(element.as_ref(), &mut handles, Some("https://a"), |_| false)
            .unwrap();

        assert!(element.is_paused());
        assert_eq!(element.pause_count(), 1);
    }

    #[test]
    fn previous_local_handle_released_when_unreferenced() {
        let (mut switcher, element, mut handles, factory) = setup();
        let url = handles
            .create(&LocalFile::new("a.mp4", "video/mp4", 1))
            .unwrap();

        switcher
            .switch(element.as_ref(), &mut handles, Some(&url), |_| false)
            .unwrap();
        switcher
            .switch(element.as_ref(), &mut handles, Some("https://b"), |_| false)
            .unwrap();

        assert_eq!(factory.revoke_count(&url), 1);
    }

    #[test]
    fn referenced_handle_is_kept() {
        let (mut switcher, element, mut handles, factory) = setup();
        let url = handles
            .create(&LocalFile::new("a.mp4", "video/mp4", 1))
            .unwrap();

        switcher
            .switch(element.as_ref(), &mut handles, Some(&url), |_| false)
            .unwrap();
        let queued = url.clone();
        switcher
            .switch(element.as_ref(), &mut handles, None, |u| u == queued)
            .unwrap();

        assert_eq!(factory.revoke_count(&url), 0);
        assert!(handles.is_outstanding(&url));
        assert_eq!(switcher.active(), None);
    }

    #[test]
    fn reselecting_same_handle_keeps_it() {
        let (mut switcher, element, mut handles, factory) = setup();
        let url = handles
            .create(&LocalFile::new("a.mp4", "video/mp4", 1))
            .unwrap();

        switcher
            .switch(element.as_ref(), &mut handles, Some(&url), |_| false)
            .unwrap();
        switcher
            .switch(element.as_ref(), &mut handles, Some(&url), |_| false)
            .unwrap();

        assert_eq!(factory.revoke_count(&url), 0);
        assert_eq!(switcher.active(), Some(url.as_str()));
    }

    #[test]
    fn failure_clears_active_source_and_guard() {
        let (mut switcher, element, mut handles, _) = setup();
        switcher
            .switch(element.as_ref(), &mut handles, Some("https://a"), |_| false)
            .unwrap();

        element.fail_next_load();
        let result = switcher.switch(element.as_ref(), &mut handles, Some("https://b"), |_| false);

        assert!(matches!(result, Err(PlayerError::Media(_))));
        assert_eq!(switcher.active(), None);
        assert!(!switcher.is_switching());
        assert_eq!(switcher.generation(), 2);

        // Next switch works normally
        switcher
            .switch(element.as_ref(), &mut handles, Some("https://c"), |_| false)
            .unwrap();
        assert_eq!(switcher.active(), Some("https://c"));
    }
}
