use anyhow::{Context, Result};

use crate::parsers::TimedItem;
use crate::transcript::TranscriptResult;
use crate::utils::{format_clock, format_marker};

/// Plain text, one cue per line, optionally prefixed with `[MM:SS]`
pub fn format_as_text(items: &[TimedItem], include_timestamps: bool) -> String {
    items
        .iter()
        .map(|item| {
            if include_timestamps {
                format!("{} {}", format_marker(item.offset), item.text)
            } else {
                item.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The same JSON body the HTTP API returns
pub fn format_as_json(result: &TranscriptResult) -> Result<String> {
    serde_json::to_string_pretty(&result.to_response()).context("Failed to serialize transcript")
}

pub fn format_as_srt(items: &[TimedItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                format_clock(item.offset, ','),
                format_clock(item.end(), ','),
                item.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_as_vtt(items: &[TimedItem]) -> String {
    let mut out = String::from("WEBVTT\n");
    for item in items {
        out.push_str(&format!(
            "\n{} --> {}\n{}\n",
            format_clock(item.offset, '.'),
            format_clock(item.end(), '.'),
            item.text
        ));
    }
    out
}

pub fn format_as_csv(items: &[TimedItem]) -> String {
    let mut out = String::from("offset,duration,text\n");
    for item in items {
        out.push_str(&format!(
            "{:.3},{:.3},\"{}\"\n",
            item.offset,
            item.duration,
            item.text.replace('"', "\"\"")
        ));
    }
    out
}
