//! Video-platform loader: video details plus the caption transcript.
//!
//! The watch page embeds the player response as a JSON object assigned to
//! `ytInitialPlayerResponse`; it carries the video details and the list of
//! caption tracks, each pointing at a timed-text XML document.

use crate::fetcher::{Fetcher, FetcherConfig};
use crate::{loader, ContentLoader, Document, InitError, LoadError, SourceKind};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

#[derive(Debug, Clone)]
pub struct YoutubeLoaderConfig {
    /// Scheme and host used for watch pages and relative caption URLs.
    pub base_url: String,
    /// Caption languages in order of preference. The first available track
    /// is used when none match.
    pub languages: Vec<String>,
}

impl Default for YoutubeLoaderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            languages: vec!["en".to_string()],
        }
    }
}

#[derive(Clone)]
pub struct YoutubeLoader {
    fetcher: Fetcher,
    config: YoutubeLoaderConfig,
}

impl YoutubeLoader {
    pub fn new(config: YoutubeLoaderConfig) -> Result<Self, InitError> {
        Ok(Self::with_fetcher(
            Fetcher::new_with_config(FetcherConfig::video_platform())?,
            config,
        ))
    }

    pub fn with_fetcher(fetcher: Fetcher, config: YoutubeLoaderConfig) -> Self {
        Self { fetcher, config }
    }

    /// Loads the transcript of the video behind `url` as one document
    /// carrying the video details as metadata.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn load_video(&self, url: &str) -> Result<Document, LoadError> {
        let video_id = extract_video_id(url).ok_or_else(|| {
            LoadError::Unsupported(format!("Could not find a video id in {url}"))
        })?;

        let watch_url = format!(
            "{}/watch?v={}",
            self.config.base_url.trim_end_matches('/'),
            video_id
        );
        let page = self.fetcher.fetch(&watch_url).await?;
        let player = parse_player_response(&page.body)?;

        if let Some(status) = &player.playability_status {
            if status.status != "OK" {
                let reason = status.reason.as_deref().unwrap_or("no reason given");
                warn!(video_id = %video_id, status = %status.status, reason = %reason, "Video is not playable");
                return Err(LoadError::Unsupported(format!(
                    "Video {video_id} is unavailable ({}): {reason}",
                    status.status
                )));
            }
        }

        let tracks = player
            .captions
            .as_ref()
            .and_then(|c| c.tracklist.as_ref())
            .map(|t| t.caption_tracks.as_slice())
            .unwrap_or_default();
        let track = select_track(tracks, &self.config.languages).ok_or_else(|| {
            LoadError::Unsupported(format!("No transcript available for video {video_id}"))
        })?;
        debug!(
            video_id = %video_id,
            language = %track.language_code,
            generated = track.is_generated(),
            "Selected caption track"
        );

        let transcript_url = self.absolute_url(&track.base_url)?;
        let xml = self.fetcher.fetch(&transcript_url).await?;
        let transcript = parse_transcript(&xml.body)?;

        let mut doc = Document::new(transcript)
            .with_metadata("source", video_id.as_str())
            .with_metadata("language", track.language_code.as_str());
        if let Some(details) = &player.video_details {
            doc = details.apply_to(doc);
        }
        if let Some(publish_date) = player
            .microformat
            .and_then(|m| m.renderer)
            .and_then(|r| r.publish_date)
        {
            doc = doc.with_metadata("publish_date", publish_date);
        }

        Ok(doc)
    }

    fn absolute_url(&self, caption_url: &str) -> Result<String, LoadError> {
        if caption_url.starts_with("http://") || caption_url.starts_with("https://") {
            return Ok(caption_url.to_string());
        }
        let base = Url::parse(&self.config.base_url)
            .map_err(|e| LoadError::Unsupported(format!("Invalid base URL: {e}")))?;
        base.join(caption_url)
            .map(String::from)
            .map_err(|e| LoadError::Unsupported(format!("Invalid caption URL: {e}")))
    }
}

#[async_trait]
impl ContentLoader for YoutubeLoader {
    async fn load(&self, url: &str, _kind: SourceKind) -> Result<Vec<Document>, LoadError> {
        let doc = self.load_video(url).await?;
        loader::ensure_content(vec![doc], url)
    }
}

/// Pulls the video id out of watch, shorts, embed, live and `/v/` URLs.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;

    let candidate = if parsed.path() == "/watch" {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else {
        let mut segments = parsed.path_segments()?;
        match segments.next() {
            Some("shorts" | "embed" | "live" | "v") => segments.next().map(String::from),
            _ => None,
        }
    }?;

    let valid = !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(candidate)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<VideoDetails>,
    captions: Option<Captions>,
    microformat: Option<Microformat>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    title: Option<String>,
    author: Option<String>,
    short_description: Option<String>,
    length_seconds: Option<String>,
    view_count: Option<String>,
    thumbnail: Option<Thumbnails>,
}

impl VideoDetails {
    fn apply_to(&self, mut doc: Document) -> Document {
        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("description", &self.short_description),
            ("length", &self.length_seconds),
            ("view_count", &self.view_count),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                doc = doc.with_metadata(key, value.as_str());
            }
        }
        // thumbnails are listed smallest first
        if let Some(thumbnail) = self.thumbnail.as_ref().and_then(|t| t.thumbnails.last()) {
            doc = doc.with_metadata("thumbnail_url", thumbnail.url.as_str());
        }
        doc
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<Tracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct Microformat {
    #[serde(rename = "playerMicroformatRenderer")]
    renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MicroformatRenderer {
    publish_date: Option<String>,
}

fn parse_player_response(html: &str) -> Result<PlayerResponse, LoadError> {
    // the page also mentions the name in plain assignments like `= null`
    let json = html
        .match_indices(PLAYER_RESPONSE_MARKER)
        .filter_map(|(start, _)| {
            let rest = html[start + PLAYER_RESPONSE_MARKER.len()..].trim_start();
            let rest = rest.strip_prefix('=')?.trim_start();
            rest.starts_with('{').then_some(rest)
        })
        .next()
        .ok_or_else(|| LoadError::Unsupported("Could not find video player data".to_string()))?;

    // the object is followed by more script, so read exactly one JSON value
    serde_json::Deserializer::from_str(json)
        .into_iter::<PlayerResponse>()
        .next()
        .ok_or_else(|| LoadError::Unsupported("Empty video player data".to_string()))?
        .map_err(|e| LoadError::Unsupported(format!("Malformed video player data: {e}")))
}

/// Manual tracks win over generated ones within a language; languages are
/// tried in preference order.
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    for language in languages {
        let matching = |t: &&CaptionTrack| t.language_code.eq_ignore_ascii_case(language);
        if let Some(track) = tracks
            .iter()
            .filter(matching)
            .find(|t| !t.is_generated())
            .or_else(|| tracks.iter().find(matching))
        {
            return Some(track);
        }
    }
    tracks.first()
}

fn parse_transcript(xml: &str) -> Result<String, LoadError> {
    let fragment = Html::parse_fragment(xml);

    // classic format uses <text>, format 3 uses <p>
    for css in ["text", "p"] {
        let selector = Selector::parse(css)
            .map_err(|e| LoadError::Unsupported(format!("Invalid selector {css}: {e:?}")))?;
        let segments: Vec<String> = fragment
            .select(&selector)
            .map(|el| decode_entities(&el.text().collect::<String>()))
            .map(|text| crate::utils::collapse_whitespace(&text))
            .filter(|text| !text.is_empty())
            .collect();
        if !segments.is_empty() {
            return Ok(segments.join(" "));
        }
    }

    Ok(String::new())
}

/// Caption text arrives escaped twice; the parser only undoes one level.
fn decode_entities(text: &str) -> String {
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=5", Some("dQw4w9WgXcQ")),
            ("https://youtube.com/shorts/abc123def45", Some("abc123def45")),
            ("https://www.youtube.com/embed/dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/live/dQw4w9WgXcQ?si=x", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/v/dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://www.youtube.com/channel/UCabc", None),
            ("https://www.youtube.com/watch", None),
            ("https://www.youtube.com/watch?v=<script>", None),
            ("not a url", None),
        ];
        for (url, expected) in cases {
            assert_eq!(extract_video_id(url).as_deref(), expected, "{url}");
        }
    }

    const WATCH_PAGE: &str = r#"<html><script>var ytInitialPlayerResponse = {"playabilityStatus":{"status":"OK"},"videoDetails":{"videoId":"abc","title":"Intro to Rust","author":"Ferris","shortDescription":"Learn Rust","lengthSeconds":"600","viewCount":"1234","thumbnail":{"thumbnails":[{"url":"https://i.ytimg.com/small.jpg"},{"url":"https://i.ytimg.com/large.jpg"}]}},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"/api/timedtext?v=abc&lang=de","languageCode":"de"},{"baseUrl":"/api/timedtext?v=abc&lang=en&kind=asr","languageCode":"en","kind":"asr"},{"baseUrl":"/api/timedtext?v=abc&lang=en","languageCode":"en"}]}},"microformat":{"playerMicroformatRenderer":{"publishDate":"2024-01-02"}}};var meta = {"x": 1};</script></html>"#;

    #[test]
    fn test_parse_player_response() {
        let player = parse_player_response(WATCH_PAGE).unwrap();
        let details = player.video_details.unwrap();
        assert_eq!(details.title.as_deref(), Some("Intro to Rust"));
        assert_eq!(details.author.as_deref(), Some("Ferris"));

        let tracks = player.captions.unwrap().tracklist.unwrap().caption_tracks;
        assert_eq!(tracks.len(), 3);
    }

    #[test]
    fn test_missing_player_response() {
        let result = parse_player_response("<html><body>consent page</body></html>");
        assert!(matches!(result, Err(LoadError::Unsupported(_))));
    }

    #[test]
    fn test_select_track_prefers_manual_language_match() {
        let tracks = parse_player_response(WATCH_PAGE)
            .unwrap()
            .captions
            .unwrap()
            .tracklist
            .unwrap()
            .caption_tracks;

        let en = select_track(&tracks, &["en".to_string()]).unwrap();
        assert_eq!(en.base_url, "/api/timedtext?v=abc&lang=en");

        let fallback = select_track(&tracks, &["fr".to_string()]).unwrap();
        assert_eq!(fallback.language_code, "de");

        assert!(select_track(&[], &["en".to_string()]).is_none());
    }

    #[test]
    fn test_parse_transcript() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.0" dur="1.5">Hello   there</text><text start="1.5" dur="2.0">it&amp;#39;s Rust &amp;amp; friends</text><text start="3.5" dur="1.0"> </text></transcript>"#;
        assert_eq!(
            parse_transcript(xml).unwrap(),
            "Hello there it's Rust & friends"
        );
    }

    #[test]
    fn test_parse_transcript_format_three() {
        let xml = r#"<timedtext format="3"><body><p t="0" d="1000">First line</p><p t="1000" d="900">second line</p></body></timedtext>"#;
        assert_eq!(parse_transcript(xml).unwrap(), "First line second line");
    }

    #[test]
    fn test_video_details_metadata() {
        let player = parse_player_response(WATCH_PAGE).unwrap();
        let doc = player.video_details.unwrap().apply_to(Document::new("t"));
        assert_eq!(doc.metadata_value("length"), Some("600"));
        assert_eq!(doc.metadata_value("view_count"), Some("1234"));
        assert_eq!(doc.metadata_value("description"), Some("Learn Rust"));
        assert_eq!(
            doc.metadata_value("thumbnail_url"),
            Some("https://i.ytimg.com/large.jpg")
        );
    }
}
