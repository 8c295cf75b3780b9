//! ASMR Resolver Server Library
//!
//! Reference implementation of the stream resolution API: yt-dlp for
//! playlist listings and stream URLs, the YouTube Data API for playlist
//! metadata.
//!
//! This library exposes the router and its components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod state;
pub mod youtube;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

// Re-export commonly used types for convenience
pub use self::config::ServerConfig;
pub use error::{Result, ServerError};
pub use extractor::{VideoExtractor, YtDlp};
pub use state::AppState;
pub use youtube::YouTubeApi;

/// All routes under `/api`, with tracing and permissive CORS
pub fn create_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/yt-playlist", post(api::resolve::yt_playlist))
        .route("/yt-stream", post(api::resolve::yt_stream))
        .route("/youtube/playlist", get(api::playlist::youtube_playlist));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
