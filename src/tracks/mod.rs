use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod params;

pub use params::{resolve_params, synthesize_params};

/// One caption track advertised by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    /// Legacy timed-text URL for this track
    pub base_url: String,

    #[serde(default)]
    pub language_code: String,

    #[serde(default)]
    pub is_default: bool,

    /// Empty for human-authored tracks, `asr` for auto-generated ones
    #[serde(default)]
    pub kind: String,

    /// Opaque request parameter accepted verbatim by the transcript RPC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,

    /// Voice/source stream identifier, e.g. `.en` or `a.en`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vss_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub name: Option<Value>,
}

impl CaptionTrack {
    pub fn is_auto_generated(&self) -> bool {
        !self.kind.is_empty()
    }

    /// Human readable track name, from either `simpleText` or joined `runs`
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.as_ref()?;

        if let Some(text) = name.get("simpleText").and_then(Value::as_str) {
            return Some(text.to_string());
        }

        let joined: String = name
            .get("runs")?
            .as_array()?
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect();

        (!joined.is_empty()).then_some(joined)
    }
}

/// Pick one track for the preferred language.
///
/// First match wins: exact (case-insensitive) language match, the platform default,
/// the first English track, then the first track. `None` only for an empty list.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: Option<&str>) -> Option<&'a CaptionTrack> {
    let wanted = preferred.map(str::trim).filter(|lang| !lang.is_empty());

    wanted
        .and_then(|lang| {
            tracks
                .iter()
                .find(|track| track.language_code.eq_ignore_ascii_case(lang))
        })
        .or_else(|| tracks.iter().find(|track| track.is_default))
        .or_else(|| {
            tracks
                .iter()
                .find(|track| track.language_code.to_ascii_lowercase().starts_with("en"))
        })
        .or_else(|| tracks.first())
}
