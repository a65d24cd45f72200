//! Watch page harvesting.
//!
//! The watch page is the only place the caption track list, the `youtubei` API key
//! and the client version are advertised together, so every transcript request
//! starts here.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::http::{HttpRequest, Transport};
use crate::identifier::VideoId;
use crate::{Result, TranscriptError};

pub mod extract;

pub use extract::{extract_client_config, extract_player_state, ClientConfig, PlayerState};

/// Locale forced on every upstream request
pub const HOST_LANGUAGE: &str = "en";
/// Region forced on every upstream request
pub const GEO_REGION: &str = "US";

/// Marker present on every normal player page
const PLAYER_MARKER: &str = "ytInitialPlayerResponse";

static CONSENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)consent").expect("consent regex is valid"));

/// Build the watch page URL for a video under the fixed locale and region
pub fn watch_url(base_url: &Url, video_id: &VideoId) -> Result<Url> {
    let mut url = base_url
        .join("/watch")
        .map_err(|e| TranscriptError::InvalidUpstreamUrl(format!("{}: {}", base_url, e)))?;

    url.query_pairs_mut()
        .append_pair("v", video_id.as_str())
        .append_pair("hl", HOST_LANGUAGE)
        .append_pair("gl", GEO_REGION)
        .append_pair("bpctr", "9999999999")
        .append_pair("has_verified", "1");

    Ok(url)
}

/// Whether the markup is a consent/region interstitial rather than a player page
pub fn is_gated(html: &str) -> bool {
    CONSENT_REGEX.is_match(html) && !html.contains(PLAYER_MARKER)
}

/// Fetch the raw watch page markup.
///
/// Fails with [`TranscriptError::RegionGated`] when the platform served a consent or
/// region interstitial instead of the player page.
pub async fn fetch_watch_page(
    transport: &dyn Transport,
    base_url: &Url,
    video_id: &VideoId,
) -> Result<String> {
    let url = watch_url(base_url, video_id)?;
    tracing::info!("Fetching watch page for {}", video_id);

    let reply = transport.send(HttpRequest::get(url.as_str())).await?;

    if !reply.is_success() {
        return Err(TranscriptError::UpstreamStatus {
            stage: "watch page",
            status: reply.status,
        });
    }

    if is_gated(&reply.body) {
        tracing::warn!("Watch page for {} is a consent/region interstitial", video_id);
        return Err(TranscriptError::RegionGated);
    }

    Ok(reply.body)
}
