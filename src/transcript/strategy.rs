use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::{Source, TranscriptResult};
use crate::http::{HttpRequest, Transport};
use crate::identifier::VideoId;
use crate::parsers::{self, vtt::VTT_SIGNATURE, TimedItem};
use crate::tracks::{resolve_params, CaptionTrack};
use crate::watch::{ClientConfig, GEO_REGION, HOST_LANGUAGE};

const DEFAULT_CLIENT_NAME: &str = "WEB";
// Numeric id of the WEB client
const CLIENT_NAME_ID: &str = "1";

/// Fetch attempts, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Youtubei,
    TimedtextDefault,
    TimedtextJson3,
    TimedtextVtt,
    TimedtextClassic,
}

impl Strategy {
    pub const ORDER: [Strategy; 5] = [
        Strategy::Youtubei,
        Strategy::TimedtextDefault,
        Strategy::TimedtextJson3,
        Strategy::TimedtextVtt,
        Strategy::TimedtextClassic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Youtubei => "youtubei",
            Strategy::TimedtextDefault => "timedtext (as advertised)",
            Strategy::TimedtextJson3 => "timedtext fmt=json3",
            Strategy::TimedtextVtt => "timedtext fmt=vtt",
            Strategy::TimedtextClassic => "timedtext (classic)",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one run of the chain needs
pub struct FetchContext<'a> {
    pub base_url: &'a Url,
    pub video_id: &'a VideoId,
    pub track: &'a CaptionTrack,
    pub client: &'a ClientConfig,
    pub preferred_language: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcClient<'a> {
    hl: &'a str,
    gl: &'a str,
    client_name: &'a str,
    client_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    visitor_data: Option<&'a str>,
}

#[derive(Serialize)]
struct RpcContext<'a> {
    client: RpcClient<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RpcBody<'a> {
    context: RpcContext<'a>,
    video_id: &'a str,
    params: &'a str,
}

/// Run every strategy in order and stop at the first non-empty transcript.
///
/// Failures of a single attempt are logged and absorbed; exhausting the chain is the
/// normal "no captions" outcome, not an error.
pub async fn run_chain(transport: &dyn Transport, ctx: &FetchContext<'_>) -> TranscriptResult {
    for strategy in Strategy::ORDER {
        match attempt(transport, ctx, strategy).await {
            Some((items, source)) => {
                tracing::info!(
                    "{} items for {} from {} ({})",
                    items.len(),
                    ctx.video_id,
                    strategy,
                    source.as_str()
                );
                return TranscriptResult::Found { items, source };
            }
            None => tracing::debug!("Strategy {} yielded nothing for {}", strategy, ctx.video_id),
        }
    }

    tracing::info!("No strategy produced captions for {}", ctx.video_id);
    TranscriptResult::NoCaptions
}

async fn attempt(
    transport: &dyn Transport,
    ctx: &FetchContext<'_>,
    strategy: Strategy,
) -> Option<(Vec<TimedItem>, Source)> {
    let request = match strategy {
        Strategy::Youtubei => youtubei_request(ctx)?,
        Strategy::TimedtextDefault => HttpRequest::get(legacy_url(ctx, None)?.as_str()),
        Strategy::TimedtextJson3 => HttpRequest::get(legacy_url(ctx, Some("json3"))?.as_str()),
        Strategy::TimedtextVtt => HttpRequest::get(legacy_url(ctx, Some("vtt"))?.as_str()),
        Strategy::TimedtextClassic => HttpRequest::get(classic_url(ctx)?.as_str()),
    };

    let reply = match transport.send(request).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("Strategy {} failed: {}", strategy, e);
            return None;
        }
    };

    if !reply.is_success() {
        tracing::warn!("Strategy {} returned HTTP {}", strategy, reply.status);
        return None;
    }

    let parsed = match strategy {
        Strategy::Youtubei => parse_youtubei(&reply.body),
        _ => parse_timedtext(&reply.body),
    };

    parsed.filter(|(items, _)| !items.is_empty())
}

/// Build the transcript RPC request; `None` when a precondition is missing
fn youtubei_request(ctx: &FetchContext<'_>) -> Option<HttpRequest> {
    let (Some(api_key), Some(client_version)) =
        (ctx.client.api_key.as_deref(), ctx.client.client_version.as_deref())
    else {
        tracing::debug!("Skipping youtubei: no API key or client version on the page");
        return None;
    };

    let Some(params) = resolve_params(ctx.track) else {
        tracing::debug!("Skipping youtubei: no params token for track {}", ctx.track.language_code);
        return None;
    };

    let mut url = ctx.base_url.join("/youtubei/v1/get_transcript").ok()?;
    url.query_pairs_mut().append_pair("key", api_key);

    let body = RpcBody {
        context: RpcContext {
            client: RpcClient {
                hl: HOST_LANGUAGE,
                gl: GEO_REGION,
                client_name: ctx.client.client_name.as_deref().unwrap_or(DEFAULT_CLIENT_NAME),
                client_version,
                visitor_data: ctx.client.visitor_data.as_deref(),
            },
        },
        video_id: ctx.video_id.as_str(),
        params: &params,
    };
    let body = serde_json::to_string(&body).ok()?;

    Some(
        HttpRequest::post(url.as_str(), body)
            .header("content-type", "application/json")
            .header("x-goog-visitor-id", ctx.client.visitor_data.clone().unwrap_or_default())
            .header("x-youtube-client-name", CLIENT_NAME_ID)
            .header("x-youtube-client-version", client_version),
    )
}

/// The track's base URL with the preferred language and an optional forced format
fn legacy_url(ctx: &FetchContext<'_>, format: Option<&str>) -> Option<Url> {
    let mut url = match Url::parse(&ctx.track.base_url) {
        Ok(url) => url,
        Err(_) => ctx.base_url.join(&ctx.track.base_url).ok()?,
    };

    if let Some(lang) = ctx.preferred_language {
        set_query_param(&mut url, "lang", lang);
    }
    if let Some(format) = format {
        set_query_param(&mut url, "fmt", format);
    }

    Some(url)
}

/// The bare `api/timedtext` form, independent of the advertised base URL
fn classic_url(ctx: &FetchContext<'_>) -> Option<Url> {
    let lang = ctx
        .preferred_language
        .or(Some(ctx.track.language_code.as_str()))
        .filter(|lang| !lang.is_empty())?;

    let mut url = ctx.base_url.join("/api/timedtext").ok()?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("v", ctx.video_id.as_str())
            .append_pair("lang", lang)
            .append_pair("fmt", "json3");
        if ctx.track.is_auto_generated() {
            query.append_pair("caps", "asr").append_pair("kind", "asr");
        }
    }

    Some(url)
}

/// Replace (or add) one query parameter, keeping the others in order
fn set_query_param(url: &mut Url, key: &str, value: &str) {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != key)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear();
    for (name, existing) in &pairs {
        query.append_pair(name, existing);
    }
    query.append_pair(key, value);
}

fn parse_youtubei(body: &str) -> Option<(Vec<TimedItem>, Source)> {
    let json: Value = serde_json::from_str(body).ok()?;
    Some((parsers::parse_transcript_panel(&json), Source::Youtubei))
}

/// Dispatch a timed-text body to the parser matching its shape
fn parse_timedtext(body: &str) -> Option<(Vec<TimedItem>, Source)> {
    let trimmed = body.trim_start();

    if trimmed.starts_with('{') {
        let json: Value = serde_json::from_str(trimmed).ok()?;
        Some((parsers::parse_json3(&json), Source::TimedtextJson3))
    } else if trimmed.contains(VTT_SIGNATURE) {
        Some((parsers::parse_vtt(trimmed), Source::TimedtextVtt))
    } else if trimmed.starts_with('<') {
        Some((parsers::parse_timedtext_xml(trimmed), Source::TimedtextXml))
    } else {
        None
    }
}
