/// Video extraction - yt-dlp wrapper for playlist listing and stream URLs
use crate::error::{Result, ServerError};
use asmr_resolver::{youtube::watch_url, PlaylistEntry};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Lists playlists and resolves playable stream URLs
#[async_trait]
pub trait VideoExtractor: Send + Sync {
    /// Flat listing of a playlist, in playlist order
    async fn flat_playlist(&self, url: &str) -> Result<Vec<PlaylistEntry>>;

    /// Direct media URL for a video id
    async fn stream_url(&self, video_id: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    format: String,
}

impl YtDlp {
    pub fn new(program: PathBuf, format: impl Into<String>) -> Self {
        Self {
            program,
            format: format.into(),
        }
    }

    /// Run yt-dlp and return its stdout, or its stderr as the error
    async fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(program = %self.program.display(), ?args, "Running extractor");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ServerError::Extractor(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ServerError::Extractor(if stderr.is_empty() {
                "yt-dlp failed".to_string()
            } else {
                stderr
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VideoExtractor for YtDlp {
    async fn flat_playlist(&self, url: &str) -> Result<Vec<PlaylistEntry>> {
        // "--" keeps a hostile URL from being read as an option
        let stdout = self
            .run(&["--flat-playlist", "--dump-json", "--", url])
            .await?;
        let entries = parse_flat_playlist(&stdout);
        tracing::info!(url = %url, entries = entries.len(), "Listed playlist");
        Ok(entries)
    }

    async fn stream_url(&self, video_id: &str) -> Result<String> {
        let watch = watch_url(video_id);
        let stdout = self.run(&["-f", &self.format, "-g", "--", &watch]).await?;
        first_url(&stdout)
            .map(str::to_string)
            .ok_or_else(|| ServerError::Extractor("No video URL found".to_string()))
    }
}

/// One JSON object per line; lines that don't parse are dropped
pub fn parse_flat_playlist(stdout: &str) -> Vec<PlaylistEntry> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<PlaylistEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unparseable playlist line");
                None
            }
        })
        .collect()
}

/// `-g` prints one URL per requested stream; the first is the muxed one
pub fn first_url(stdout: &str) -> Option<&str> {
    stdout.lines().map(str::trim).find(|line| !line.is_empty())
}
