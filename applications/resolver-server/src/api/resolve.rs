/// yt-dlp backed resolution routes
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use asmr_resolver::{PlaylistResponse, StreamResponse};
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

/// Non-empty string field of a JSON object body
fn string_field(body: &[u8], field: &str, invalid: &str) -> Result<String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ServerError::BadRequest(invalid.to_string()))?;

    match value.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ServerError::BadRequest(invalid.to_string())),
    }
}

/// POST /api/yt-playlist - Flat listing of a playlist
pub async fn yt_playlist(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlaylistResponse>> {
    let url = string_field(&body, "url", "Missing or invalid playlist URL")?;

    let playlist = state.extractor.flat_playlist(&url).await?;

    Ok(Json(PlaylistResponse { playlist }))
}

/// POST /api/yt-stream - Direct stream URL for a video id
pub async fn yt_stream(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StreamResponse>> {
    let id = string_field(&body, "id", "Missing or invalid video ID")?;

    let url = state.extractor.stream_url(&id).await?;
    tracing::debug!(video_id = %id, "Resolved stream");

    Ok(Json(StreamResponse { url }))
}
