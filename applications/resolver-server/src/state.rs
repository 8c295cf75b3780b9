/// Shared application state
use crate::config::ServerConfig;
use crate::error::Result;
use crate::extractor::{VideoExtractor, YtDlp};
use crate::youtube::YouTubeApi;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn VideoExtractor>,
    /// Absent when no API key is configured
    pub youtube: Option<Arc<YouTubeApi>>,
}

impl AppState {
    pub fn new(extractor: Arc<dyn VideoExtractor>, youtube: Option<Arc<YouTubeApi>>) -> Self {
        Self { extractor, youtube }
    }

    /// Build the yt-dlp extractor and, given a key, the YouTube client
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let extractor = YtDlp::new(
            config.extractor.ytdlp_path.clone(),
            config.extractor.format.clone(),
        );

        let youtube = match &config.youtube.api_key {
            Some(key) => Some(Arc::new(YouTubeApi::new(
                key.clone(),
                config.youtube.api_base.clone(),
                config.youtube.timeout(),
            )?)),
            None => None,
        };

        Ok(Self::new(Arc::new(extractor), youtube))
    }
}
