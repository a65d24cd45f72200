use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::http::{BrowserProfile, ReqwestTransport, Transport};
use crate::identifier::VideoId;
use crate::parsers::TimedItem;
use crate::tracks::{select_track, CaptionTrack};
use crate::watch::{self, extract_client_config, extract_player_state};
use crate::{Result, TranscriptError};

pub mod strategy;

pub use strategy::Strategy;

pub const NO_TRACKS_NOTE: &str = "No caption tracks listed.";
pub const NO_CAPTIONS_ERROR: &str = "No captions available for this video/language.";

/// Payload format a transcript was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "youtubei")]
    Youtubei,
    #[serde(rename = "timedtext-json3")]
    TimedtextJson3,
    #[serde(rename = "timedtext-vtt")]
    TimedtextVtt,
    #[serde(rename = "timedtext-xml")]
    TimedtextXml,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Youtubei => "youtubei",
            Source::TimedtextJson3 => "timedtext-json3",
            Source::TimedtextVtt => "timedtext-vtt",
            Source::TimedtextXml => "timedtext-xml",
        }
    }
}

/// Terminal value of the pipeline.
///
/// All three variants are successful runs; faults are reported as [`TranscriptError`].
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptResult {
    /// A strategy produced a non-empty transcript
    Found { items: Vec<TimedItem>, source: Source },
    /// The player advertised no caption tracks at all
    NoTracks,
    /// Tracks exist but every strategy came back empty
    NoCaptions,
}

impl TranscriptResult {
    pub fn items(&self) -> &[TimedItem] {
        match self {
            TranscriptResult::Found { items, .. } => items,
            _ => &[],
        }
    }

    pub fn source(&self) -> Option<Source> {
        match self {
            TranscriptResult::Found { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// JSON body returned to callers
    pub fn to_response(&self) -> TranscriptResponse {
        match self {
            TranscriptResult::Found { items, source } => TranscriptResponse {
                ok: true,
                items: Some(items.clone()),
                source: Some(*source),
                note: None,
                error: None,
            },
            TranscriptResult::NoTracks => TranscriptResponse {
                ok: true,
                items: Some(Vec::new()),
                source: None,
                note: Some(NO_TRACKS_NOTE.to_string()),
                error: None,
            },
            TranscriptResult::NoCaptions => TranscriptResponse::failure(NO_CAPTIONS_ERROR),
        }
    }
}

/// Wire shape: `{ok, items, source}`, `{ok, items, note}` or `{ok: false, error}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TimedItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: None,
            source: None,
            note: None,
            error: Some(error.into()),
        }
    }
}

/// Treat an empty or `auto` language selector as "no preference"
pub fn normalize_language(preferred: Option<&str>) -> Option<String> {
    preferred
        .map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty() && lang != "auto")
}

/// Main acquisition pipeline.
///
/// Holds only immutable configuration; every call builds its own state, so one
/// pipeline can serve concurrent requests.
#[derive(Clone)]
pub struct TranscriptPipeline {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl TranscriptPipeline {
    /// Create a pipeline backed by the reqwest transport
    pub fn new(config: &Config) -> Result<Self> {
        let profile = Arc::new(BrowserProfile::default());
        let transport = ReqwestTransport::new(profile, Duration::from_secs(config.upstream.timeout_secs))?;
        Self::with_transport(Arc::new(transport), &config.upstream.base_url)
    }

    /// Create a pipeline over any transport
    pub fn with_transport(transport: Arc<dyn Transport>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TranscriptError::InvalidUpstreamUrl(format!("{}: {}", base_url, e)))?;

        Ok(Self { transport, base_url })
    }

    /// Retrieve a transcript for a raw id or URL.
    ///
    /// Errors are limited to an unusable identifier, region gating, and failures of the
    /// watch page stage; per-strategy failures are absorbed by the fetch chain.
    pub async fn get_transcript(
        &self,
        raw: &str,
        preferred_language: Option<&str>,
    ) -> Result<TranscriptResult> {
        let video_id = parse_identifier(raw)?;
        let preferred = normalize_language(preferred_language);

        let html = watch::fetch_watch_page(self.transport.as_ref(), &self.base_url, &video_id).await?;
        let client = extract_client_config(&html);
        let tracks = extract_player_state(&html).caption_tracks();

        tracing::info!("{} caption track(s) advertised for {}", tracks.len(), video_id);

        let Some(track) = select_track(&tracks, preferred.as_deref()) else {
            return Ok(TranscriptResult::NoTracks);
        };

        tracing::debug!(
            "Selected track lang={} kind={} default={}",
            track.language_code,
            if track.kind.is_empty() { "manual" } else { track.kind.as_str() },
            track.is_default
        );

        let ctx = strategy::FetchContext {
            base_url: &self.base_url,
            video_id: &video_id,
            track,
            client: &client,
            preferred_language: preferred.as_deref(),
        };

        Ok(strategy::run_chain(self.transport.as_ref(), &ctx).await)
    }

    /// List every caption track advertised for a video
    pub async fn list_tracks(&self, raw: &str) -> Result<Vec<CaptionTrack>> {
        let video_id = parse_identifier(raw)?;
        let html = watch::fetch_watch_page(self.transport.as_ref(), &self.base_url, &video_id).await?;
        Ok(extract_player_state(&html).caption_tracks())
    }
}

fn parse_identifier(raw: &str) -> Result<VideoId> {
    VideoId::parse(raw).ok_or_else(|| TranscriptError::InvalidIdentifier(raw.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpReply, HttpRequest, MockTransport};
    use serde_json::json;

    const VIDEO: &str = "iG9CE55wbtY";

    fn watch_page(tracks: serde_json::Value) -> String {
        let player = json!({ "captions": { "playerCaptionsTracklistRenderer": { "captionTracks": tracks } } });
        format!(
            r#"<html><script>ytcfg.set({{"INNERTUBE_API_KEY":"AIzaKey","INNERTUBE_CLIENT_VERSION":"2.20240101"}});</script><script>var ytInitialPlayerResponse = {};</script></html>"#,
            player
        )
    }

    fn pipeline(transport: MockTransport) -> TranscriptPipeline {
        TranscriptPipeline::with_transport(Arc::new(transport), "https://www.youtube.com").unwrap()
    }

    fn is_watch(request: &HttpRequest) -> bool {
        request.url.contains("/watch?")
    }

    #[tokio::test]
    async fn test_invalid_identifier_makes_no_requests() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0).returning(|_| Ok(HttpReply::new(200, "")));

        let err = pipeline(transport).get_transcript("https://example.com/x", None).await.unwrap_err();
        assert!(matches!(err, TranscriptError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_zero_tracks_is_a_success() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(is_watch)
            .times(1)
            .returning(|_| Ok(HttpReply::new(200, watch_page(json!([])))));

        let result = pipeline(transport).get_transcript(VIDEO, None).await.unwrap();
        assert_eq!(result, TranscriptResult::NoTracks);

        let body = serde_json::to_value(result.to_response()).unwrap();
        assert_eq!(body, json!({ "ok": true, "items": [], "note": "No caption tracks listed." }));
    }

    #[tokio::test]
    async fn test_default_english_track_end_to_end() {
        let mut transport = MockTransport::new();
        transport.expect_send().withf(is_watch).returning(|_| {
            Ok(HttpReply::new(
                200,
                watch_page(json!([{
                    "baseUrl": "https://www.youtube.com/api/timedtext?v=iG9CE55wbtY&lang=en",
                    "languageCode": "en",
                    "isDefault": true,
                    "vssId": ".en"
                }])),
            ))
        });
        transport
            .expect_send()
            .withf(|request| request.url.contains("/youtubei/v1/get_transcript"))
            .returning(|_| Ok(HttpReply::new(403, "")));
        transport
            .expect_send()
            .withf(|request| request.url.contains("/api/timedtext"))
            .returning(|_| {
                Ok(HttpReply::new(
                    200,
                    r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="1.5">hi</text></transcript>"#,
                ))
            });

        let result = pipeline(transport).get_transcript(&format!("https://youtu.be/{}", VIDEO), None).await.unwrap();
        assert_eq!(result.source(), Some(Source::TimedtextXml));
        assert_eq!(result.items().len(), 1);

        let body = serde_json::to_value(result.to_response()).unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["source"], "timedtext-xml");
        assert_eq!(body["items"][0], json!({ "text": "hi", "offset": 0.0, "duration": 1.5 }));
    }

    #[tokio::test]
    async fn test_gated_page_is_an_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpReply::new(200, "<html>consent required</html>")));

        let err = pipeline(transport).get_transcript(VIDEO, Some("en")).await.unwrap_err();
        assert!(matches!(err, TranscriptError::RegionGated));
    }

    #[tokio::test]
    async fn test_list_tracks() {
        let mut transport = MockTransport::new();
        transport.expect_send().withf(is_watch).returning(|_| {
            Ok(HttpReply::new(
                200,
                watch_page(json!([
                    { "baseUrl": "https://x/api/timedtext?lang=en", "languageCode": "en" },
                    { "baseUrl": "https://x/api/timedtext?lang=fr", "languageCode": "fr", "kind": "asr" }
                ])),
            ))
        });

        let tracks = pipeline(transport).list_tracks(VIDEO).await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks[1].is_auto_generated());
    }

    #[test]
    fn test_no_captions_response() {
        let body = serde_json::to_value(TranscriptResult::NoCaptions.to_response()).unwrap();
        assert_eq!(body, json!({ "ok": false, "error": "No captions available for this video/language." }));
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language(Some("AUTO")), None);
        assert_eq!(normalize_language(Some("  ")), None);
        assert_eq!(normalize_language(None), None);
        assert_eq!(normalize_language(Some("De")).as_deref(), Some("de"));
    }
}
