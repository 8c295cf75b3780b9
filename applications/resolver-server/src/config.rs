/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_extractor")]
    pub extractor: ExtractorSettings,

    #[serde(default = "default_youtube")]
    pub youtube: YouTubeSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorSettings {
    /// yt-dlp executable, looked up on `PATH` when not absolute
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Format selector passed to `yt-dlp -f`
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YouTubeSettings {
    /// Data API v3 key; playlist metadata is unavailable without one
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl YouTubeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// `path` overrides the default `config.toml`. Environment variables use
    /// the `ASMR_` prefix with `__` between sections, e.g.
    /// `ASMR_YOUTUBE__API_KEY`. A bare `YOUTUBE_API_KEY` is honoured too.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ASMR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let mut config: Self = config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        if config.youtube.api_key.is_none() {
            config.youtube.api_key = std::env::var("YOUTUBE_API_KEY").ok();
        }
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.extractor.ytdlp_path.as_os_str().is_empty() {
            return Err(ServerError::Config(
                "yt-dlp path is required (set ASMR_EXTRACTOR__YTDLP_PATH)".to_string(),
            ));
        }

        if self.extractor.format.trim().is_empty() {
            return Err(ServerError::Config(
                "yt-dlp format selector cannot be empty".to_string(),
            ));
        }

        if self.youtube.timeout_secs == 0 {
            return Err(ServerError::Config(
                "YouTube API timeout must be at least one second".to_string(),
            ));
        }

        if self
            .youtube
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            return Err(ServerError::Config("YouTube API key is blank".to_string()));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_extractor() -> ExtractorSettings {
    ExtractorSettings {
        ytdlp_path: default_ytdlp_path(),
        format: default_format(),
    }
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_format() -> String {
    // Progressive H.264/AAC plays in every browser without MSE
    "best[ext=mp4][vcodec^=avc1][acodec^=mp4a]/best".to_string()
}

fn default_youtube() -> YouTubeSettings {
    YouTubeSettings {
        api_key: None,
        api_base: default_api_base(),
        timeout_secs: default_timeout_secs(),
    }
}

fn default_api_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            extractor: default_extractor(),
            youtube: default_youtube(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.youtube.timeout(), Duration::from_secs(10));
        assert!(config.extractor.format.starts_with("best[ext=mp4]"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_format_rejected() {
        let mut config = ServerConfig::default();
        config.extractor.format = "  ".to_string();
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = ServerConfig::default();
        config.youtube.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_api_key_rejected() {
        let mut config = ServerConfig::default();
        config.youtube.api_key = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ServerConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 8088\n\n[youtube]\napi_key = \"k\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.youtube.api_key.as_deref(), Some("k"));
        assert_eq!(config.extractor.ytdlp_path, PathBuf::from("yt-dlp"));
    }
}
