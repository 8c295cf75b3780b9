//! Local object URL lifecycle
//!
//! Every local file gets a `blob:` URL that pins the file in memory until it
//! is revoked. The registry records which URLs are outstanding so each one is
//! revoked exactly once, no matter how many paths (removal, clear, source
//! replacement, teardown) try to release it.

use crate::error::Result;
use crate::types::LocalFile;
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// URL scheme of locally generated handles
pub const LOCAL_HANDLE_SCHEME: &str = "blob:";

/// Whether `url` is a locally generated handle
pub fn is_local_handle(url: &str) -> bool {
    url.starts_with(LOCAL_HANDLE_SCHEME)
}

/// Platform object URL support (`URL.createObjectURL` / `revokeObjectURL`)
pub trait ObjectUrlFactory {
    fn create(&self, file: &LocalFile) -> Result<String>;

    fn revoke(&self, url: &str) -> Result<()>;
}

/// Tracks outstanding local handles
///
/// Only handles this registry created are ever revoked. Once released a URL
/// is forgotten, so memory is bounded by what is currently held.
pub struct HandleRegistry {
    factory: Box<dyn ObjectUrlFactory>,
    outstanding: HashSet<String>,
}

impl HandleRegistry {
    pub fn new(factory: Box<dyn ObjectUrlFactory>) -> Self {
        Self {
            factory,
            outstanding: HashSet::new(),
        }
    }

    /// Create a handle for `file`
    ///
    /// Returns `None` (and logs) when the platform refuses; the caller skips
    /// the file.
    pub fn create(&mut self, file: &LocalFile) -> Option<String> {
        match self.factory.create(file) {
            Ok(url) => {
                debug!(url = %url, name = %file.name, "Created local handle");
                self.outstanding.insert(url.clone());
                Some(url)
            }
            Err(e) => {
                error!(name = %file.name, error = %e, "Failed to create local handle");
                None
            }
        }
    }

    /// Release a handle
    ///
    /// Foreign, unknown and already-released URLs are ignored. Returns
    /// whether a revoke was issued.
    pub fn release(&mut self, url: &str) -> bool {
        if !is_local_handle(url) {
            warn!(url = %url, "Ignoring release of non-local URL");
            return false;
        }
        if !self.outstanding.remove(url) {
            debug!(url = %url, "Handle not outstanding, already released or never created");
            return false;
        }

        // Counted as released even when revoke fails, a second attempt
        // would fail the same way
        if let Err(e) = self.factory.revoke(url) {
            error!(url = %url, error = %e, "Failed to revoke local handle");
        } else {
            debug!(url = %url, "Released local handle");
        }
        true
    }

    /// Release every outstanding handle; returns how many were released
    pub fn release_all(&mut self) -> usize {
        let urls: Vec<String> = self.outstanding.iter().cloned().collect();
        urls.iter().filter(|url| self.release(url)).count()
    }

    pub fn is_outstanding(&self, url: &str) -> bool {
        self.outstanding.contains(url)
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }
}
