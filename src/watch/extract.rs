use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::tracks::CaptionTrack;

/// Ordered pattern candidates locating the `ytcfg.set({...})` blob.
/// Each pattern ends on the opening brace of the JSON value.
static CLIENT_CONFIG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[r"ytcfg\.set\(\s*\{"])
});

/// Ordered pattern candidates locating the player state; the serialization differs
/// between page template revisions.
static PLAYER_STATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"ytInitialPlayerResponse\s*=\s*\{",
        r#""ytInitialPlayerResponse"\s*:\s*\{"#,
        r#"window\["ytInitialPlayerResponse"\]\s*=\s*\{"#,
    ])
});

/// Loose `"KEY":"value"` pairs, one per entry of [`ClientConfig::KEYS`]
static LOOSE_PAIR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let patterns: Vec<String> = ClientConfig::KEYS
        .iter()
        .map(|key| format!(r#""{}"\s*:\s*"([^"]+)""#, regex::escape(key)))
        .collect();
    compile_all(&patterns.iter().map(String::as_str).collect::<Vec<_>>())
});

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("extraction pattern is valid"))
        .collect()
}

/// Client configuration keys read from `ytcfg`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub client_version: Option<String>,
    pub client_name: Option<String>,
    pub visitor_data: Option<String>,
}

impl ClientConfig {
    const API_KEY: &'static str = "INNERTUBE_API_KEY";
    const CLIENT_VERSION: &'static str = "INNERTUBE_CLIENT_VERSION";
    const CLIENT_NAME: &'static str = "INNERTUBE_CLIENT_NAME";
    const VISITOR_DATA: &'static str = "VISITOR_DATA";
    const KEYS: [&'static str; 4] = [Self::API_KEY, Self::CLIENT_VERSION, Self::CLIENT_NAME, Self::VISITOR_DATA];

    fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            api_key: field(Self::API_KEY),
            client_version: field(Self::CLIENT_VERSION),
            client_name: field(Self::CLIENT_NAME),
            visitor_data: field(Self::VISITOR_DATA),
        }
    }

    /// Fill keys the blob did not carry from loose `"KEY":"value"` pairs in the markup
    fn fill_from_markup(&mut self, html: &str) {
        // Same order as KEYS
        let slots = [
            &mut self.api_key,
            &mut self.client_version,
            &mut self.client_name,
            &mut self.visitor_data,
        ];

        for (slot, pattern) in slots.into_iter().zip(LOOSE_PAIR_PATTERNS.iter()) {
            if slot.is_none() {
                *slot = pattern.captures(html).map(|caps| caps[1].to_string());
            }
        }
    }
}

/// Player state blob; only the caption track list is interpreted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState(pub Value);

impl PlayerState {
    /// Caption tracks advertised by the player, in page order.
    ///
    /// Entries that do not decode as a track are skipped.
    pub fn caption_tracks(&self) -> Vec<CaptionTrack> {
        let Some(tracks) = self
            .0
            .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        tracks
            .iter()
            .filter_map(|track| match serde_json::from_value(track.clone()) {
                Ok(track) => Some(track),
                Err(e) => {
                    tracing::debug!("Skipping undecodable caption track: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Extract the client configuration; absent keys are left empty
pub fn extract_client_config(html: &str) -> ClientConfig {
    let mut config = first_json_object(html, &CLIENT_CONFIG_PATTERNS)
        .map(|value| ClientConfig::from_value(&value))
        .unwrap_or_default();
    config.fill_from_markup(html);
    config
}

/// Extract the player state; an empty object when no candidate parses
pub fn extract_player_state(html: &str) -> PlayerState {
    let value = first_json_object(html, &PLAYER_STATE_PATTERNS)
        .unwrap_or_else(|| Value::Object(Default::default()));
    PlayerState(value)
}

/// Try each pattern in order, and each of its occurrences in page order; the first
/// occurrence whose brace starts a parseable JSON object wins.
fn first_json_object(html: &str, patterns: &[Regex]) -> Option<Value> {
    for pattern in patterns {
        for found in pattern.find_iter(html) {
            let start = found.end() - 1;
            match parse_json_prefix(&html[start..]) {
                Some(value) if value.is_object() => return Some(value),
                _ => tracing::debug!("Pattern {} matched but did not parse", pattern.as_str()),
            }
        }
    }
    None
}

/// Parse exactly one JSON value from the start of `text`, ignoring whatever follows it
fn parse_json_prefix(text: &str) -> Option<Value> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .next()?
        .ok()
}
