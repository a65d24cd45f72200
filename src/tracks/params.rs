//! Request parameter synthesis for the transcript RPC.
//!
//! When a track does not carry its own `params` token, the RPC still accepts a token
//! built from the track's voice/source stream id and language code. The token is a
//! two-field length-delimited message:
//!
//! ```text
//! 0x0A <varint len> <vssId utf-8 bytes>       field 1, wire type 2
//! 0x12 <varint len> <languageCode utf-8 bytes> field 2, wire type 2
//! ```
//!
//! Lengths are base-128 varints (low 7 bits first, high bit set on every byte except
//! the last). The bytes are then base64 encoded with the URL-safe alphabet (`-`, `_`)
//! and no `=` padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use url::Url;

use super::CaptionTrack;

const VSS_ID_TAG: u8 = 0x0A;
const LANGUAGE_TAG: u8 = 0x12;
const FALLBACK_LANGUAGE: &str = "en";

/// The track's own `params` when present, otherwise a synthesized token
pub fn resolve_params(track: &CaptionTrack) -> Option<String> {
    track
        .params
        .as_deref()
        .filter(|params| !params.is_empty())
        .map(str::to_string)
        .or_else(|| synthesize_params(track))
}

/// Build the RPC token from the track's vssId and language code.
///
/// The vssId comes from the track record, or failing that from the `vssId`/`vssids`
/// query parameter of its base URL. Returns `None` when it cannot be recovered.
pub fn synthesize_params(track: &CaptionTrack) -> Option<String> {
    let vss_id = track
        .vss_id
        .clone()
        .filter(|id| !id.is_empty())
        .or_else(|| vss_id_from_url(&track.base_url))?;

    let language = if track.language_code.is_empty() {
        FALLBACK_LANGUAGE
    } else {
        track.language_code.as_str()
    };

    Some(encode_token(&vss_id, language))
}

fn vss_id_from_url(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    ["vssId", "vssids"].iter().find_map(|key| {
        pairs
            .iter()
            .find(|(name, value)| name == key && !value.is_empty())
            .map(|(_, value)| value.clone())
    })
}

/// Serialize both fields and base64url encode them
pub fn encode_token(vss_id: &str, language: &str) -> String {
    let mut payload = Vec::with_capacity(vss_id.len() + language.len() + 6);
    write_field(&mut payload, VSS_ID_TAG, vss_id.as_bytes());
    write_field(&mut payload, LANGUAGE_TAG, language.as_bytes());
    URL_SAFE_NO_PAD.encode(payload)
}

fn write_field(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    out.push(tag);
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value > 0x7F {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}
