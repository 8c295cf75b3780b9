//! YouTube URL helpers

use url::Url;

/// Playlist id from the `list` parameter of a youtube.com or youtu.be URL
pub fn playlist_id_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    if !host.contains("youtube.com") && !host.contains("youtu.be") {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

/// Watch page for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_list_parameter() {
        assert_eq!(
            playlist_id_from_url("https://www.youtube.com/playlist?list=PLabc123").as_deref(),
            Some("PLabc123")
        );
        assert_eq!(
            playlist_id_from_url("https://www.youtube.com/watch?v=xyz&list=PLdef&index=2").as_deref(),
            Some("PLdef")
        );
        assert_eq!(
            playlist_id_from_url("https://youtu.be/xyz?list=PLshort").as_deref(),
            Some("PLshort")
        );
        assert_eq!(
            playlist_id_from_url("https://music.youtube.com/playlist?list=PLmusic").as_deref(),
            Some("PLmusic")
        );
    }

    #[test]
    fn rejects_other_urls() {
        assert_eq!(playlist_id_from_url("https://vimeo.com/channels?list=PL1"), None);
        assert_eq!(playlist_id_from_url("https://www.youtube.com/watch?v=xyz"), None);
        assert_eq!(playlist_id_from_url("https://www.youtube.com/playlist?list="), None);
        assert_eq!(playlist_id_from_url("not a url"), None);
    }

    #[test]
    fn builds_watch_url() {
        assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
    }
}
