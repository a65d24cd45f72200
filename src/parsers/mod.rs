//! Pure payload parsers.
//!
//! Every upstream encoding maps into the same ordered list of [`TimedItem`]s. Parsers
//! never fail on a malformed entry; they drop it and keep going.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod json3;
pub mod panel;
pub mod vtt;
pub mod xml;

pub use json3::parse_json3;
pub use panel::parse_transcript_panel;
pub use vtt::parse_vtt;
pub use xml::parse_timedtext_xml;

/// One caption cue, times in seconds from the start of the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedItem {
    pub text: String,
    pub offset: f64,
    pub duration: f64,
}

impl TimedItem {
    /// Build an item from raw cue text; `None` when the collapsed text is empty
    pub(crate) fn from_raw(raw: &str, offset: f64, duration: f64) -> Option<Self> {
        let text = collapse_whitespace(raw);
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text,
            offset: offset.max(0.0),
            duration: duration.max(0.0),
        })
    }

    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Millisecond field that may arrive as a JSON number or a numeric string
pub(crate) fn millis(value: Option<&Value>) -> Option<f64> {
    let ms = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    ms.filter(|ms| ms.is_finite())
}
