use super::js_error_message;
use crate::error::{PlayerError, Result};
use crate::handles::ObjectUrlFactory;
use crate::types::LocalFile;
use web_sys::{File, Url};

/// `URL.createObjectURL` / `URL.revokeObjectURL`
///
/// Expects each [`LocalFile`] to carry its `web_sys::File` as payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlobUrlFactory;

impl ObjectUrlFactory for BlobUrlFactory {
    fn create(&self, file: &LocalFile) -> Result<String> {
        let blob = file
            .payload::<File>()
            .ok_or_else(|| PlayerError::Handle(format!("{} has no file payload", file.name)))?;
        Url::create_object_url_with_blob(blob).map_err(|e| PlayerError::Handle(js_error_message(&e)))
    }

    fn revoke(&self, url: &str) -> Result<()> {
        Url::revoke_object_url(url).map_err(|e| PlayerError::Handle(js_error_message(&e)))
    }
}
