/// Playlist metadata route (YouTube Data API)
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use asmr_resolver::{youtube::playlist_id_from_url, PlaylistPage};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistQuery {
    pub playlist_id: Option<String>,
    pub url: Option<String>,
    pub page_token: Option<String>,
}

impl PlaylistQuery {
    /// Explicit id wins over one parsed from `url`
    fn resolve_id(&self) -> Option<String> {
        self.playlist_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| self.url.as_deref().and_then(playlist_id_from_url))
    }
}

/// GET /api/youtube/playlist - Titles, channels and thumbnails of a playlist
pub async fn youtube_playlist(
    State(state): State<AppState>,
    Query(query): Query<PlaylistQuery>,
) -> Result<Json<PlaylistPage>> {
    let playlist_id = query
        .resolve_id()
        .ok_or_else(|| ServerError::BadRequest("Missing or invalid playlist ID/URL".to_string()))?;

    let api = state
        .youtube
        .as_ref()
        .ok_or_else(|| ServerError::NotConfigured("YouTube API key not configured".to_string()))?;

    let page = api
        .playlist_items(&playlist_id, query.page_token.as_deref())
        .await?;

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_id_wins() {
        let query = PlaylistQuery {
            playlist_id: Some("PLexplicit".to_string()),
            url: Some("https://www.youtube.com/playlist?list=PLfromurl".to_string()),
            page_token: None,
        };
        assert_eq!(query.resolve_id().as_deref(), Some("PLexplicit"));
    }

    #[test]
    fn id_parsed_from_url() {
        let query = PlaylistQuery {
            url: Some("https://youtu.be/abc?list=PLshort".to_string()),
            ..Default::default()
        };
        assert_eq!(query.resolve_id().as_deref(), Some("PLshort"));
    }

    #[test]
    fn empty_id_falls_back_to_url() {
        let query = PlaylistQuery {
            playlist_id: Some(String::new()),
            url: Some("https://vimeo.com/?list=PL1".to_string()),
            page_token: None,
        };
        assert_eq!(query.resolve_id(), None);
    }
}
