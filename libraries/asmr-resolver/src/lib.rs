//! ASMR Player Resolver Client
//!
//! HTTP client for the stream resolution API, which turns YouTube playlists
//! and video ids into directly playable URLs.
//!
//! # Features
//!
//! - **Playlist resolution**: `POST /api/yt-playlist`
//! - **Stream resolution**: `POST /api/yt-stream`
//! - **Playlist metadata**: `GET /api/youtube/playlist`
//! - **Ingestion**: resolve a playlist and all its streams into queue items,
//!   skipping entries that fail
//!
//! # Example
//!
//! ```ignore
//! use asmr_resolver::{ingest_playlist, ResolverClient, ResolverConfig};
//!
//! let client = ResolverClient::new(ResolverConfig::new("http://localhost:3000"))?;
//! let report = ingest_playlist(&client, "https://www.youtube.com/playlist?list=PL123", 4).await?;
//! player.add_remote_items(report.items);
//! ```

mod client;
mod error;
mod ingest;
mod types;
pub mod youtube;

pub use client::{ResolverClient, StreamResolver};
pub use error::{ResolverError, Result};
pub use ingest::{ingest_playlist, IngestReport, SkippedEntry};
pub use types::{
    renditions, ErrorBody, PlaylistEntry, PlaylistPage, PlaylistRequest, PlaylistResponse,
    PlaylistVideo, ResolverConfig, StreamRequest, StreamResponse,
};
