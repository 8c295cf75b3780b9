//! Playlist ingestion
//!
//! Resolves a playlist, then every entry's stream, keeping playlist order.
//! A stream that fails to resolve is skipped; a playlist that fails to
//! resolve fails the whole call.

use crate::client::StreamResolver;
use crate::error::Result;
use crate::types::PlaylistEntry;
use asmr_playback::RemoteItem;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

/// An entry left out of the batch
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub id: String,
    pub title: String,
    pub reason: String,
}

/// Outcome of [`ingest_playlist`]
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Resolved items, in playlist order, ready for the queue
    pub items: Vec<RemoteItem>,
    pub skipped: Vec<SkippedEntry>,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Resolve `playlist_url` into queue items
///
/// At most `concurrency` stream resolutions run at once (minimum 1).
pub async fn ingest_playlist(
    resolver: &dyn StreamResolver,
    playlist_url: &str,
    concurrency: usize,
) -> Result<IngestReport> {
    let entries = resolver.resolve_playlist(playlist_url).await?;
    let total = entries.len();

    let results: Vec<(PlaylistEntry, Result<String>)> = stream::iter(entries)
        .map(|entry| async move {
            let resolved = resolver.resolve_stream(&entry.id).await;
            (entry, resolved)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = IngestReport::default();
    for (entry, resolved) in results {
        match resolved {
            Ok(url) => report.items.push(entry.into_remote_item(url)),
            Err(e) => {
                warn!(id = %entry.id, error = %e, "Skipping entry, stream not resolved");
                report.skipped.push(SkippedEntry {
                    id: entry.id,
                    title: entry.title,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        total,
        resolved = report.items.len(),
        skipped = report.skipped.len(),
        "Ingested playlist"
    );
    Ok(report)
}
