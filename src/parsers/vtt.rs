use regex::Regex;
use std::sync::LazyLock;

use super::TimedItem;

/// Signature header every WebVTT body starts with
pub const VTT_SIGNATURE: &str = "WEBVTT";

static CUE_TIMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(\d+):)?(\d{2}):(\d{2}(?:\.\d{1,3})?)\s+-->\s+(?:(\d+):)?(\d{2}):(\d{2}(?:\.\d{1,3})?)")
        .expect("cue timing regex is valid")
});

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]+>").expect("inline tag regex is valid"));

/// Parse a WebVTT body.
///
/// A cue is a `HH:MM:SS.mmm --> HH:MM:SS.mmm` line followed by text lines up to the
/// next blank line or timing line. Inline tags (`<c>`, `<00:00:01.000>`, ...) are removed.
pub fn parse_vtt(body: &str) -> Vec<TimedItem> {
    let mut items = Vec::new();
    let mut current: Option<(f64, f64, Vec<&str>)> = None;

    for line in body.lines() {
        if let Some((start, end)) = parse_timing(line) {
            flush(&mut items, current.take());
            current = Some((start, end, Vec::new()));
        } else if line.trim().is_empty() {
            flush(&mut items, current.take());
        } else if let Some((_, _, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    flush(&mut items, current);

    items
}

fn flush(items: &mut Vec<TimedItem>, cue: Option<(f64, f64, Vec<&str>)>) {
    let Some((start, end, lines)) = cue else {
        return;
    };

    let stripped = INLINE_TAG.replace_all(&lines.join("\n"), "").into_owned();
    let decoded = html_escape::decode_html_entities(&stripped);

    if let Some(item) = TimedItem::from_raw(&decoded, start, end - start) {
        items.push(item);
    }
}

fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let caps = CUE_TIMING.captures(line)?;

    let seconds = |hours: Option<regex::Match>, minutes: &str, secs: &str| -> Option<f64> {
        let hours = hours.map_or(Ok(0.0), |h| h.as_str().parse::<f64>()).ok()?;
        let minutes = minutes.parse::<f64>().ok()?;
        let secs = secs.parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + secs)
    };

    let start = seconds(caps.get(1), &caps[2], &caps[3])?;
    let end = seconds(caps.get(4), &caps[5], &caps[6])?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block() {
        let items = parse_vtt("00:00:01.000 --> 00:00:03.500\nHello world");
        assert_eq!(items, vec![TimedItem { text: "Hello world".into(), offset: 1.0, duration: 2.5 }]);
    }

    #[test]
    fn test_full_document() {
        let body = "WEBVTT\nKind: captions\nLanguage: en\n\n\
00:00:00.000 --> 00:00:02.000 align:start position:0%\n\
first <c>line</c>\nsecond line\n\n\
00:00:02.000 --> 00:00:04.250\n\
<00:00:02.500><c> tagged</c> &amp; decoded\n\
00:01:02.000 --> 01:00:00.000\n\
back to back\n";

        let items = parse_vtt(body);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "first line second line");
        assert_eq!(items[0].duration, 2.0);
        assert_eq!(items[1].text, "tagged & decoded");
        assert_eq!(items[1].offset, 2.0);
        assert_eq!(items[1].duration, 2.25);
        assert_eq!(items[2].offset, 62.0);
        assert_eq!(items[2].duration, 3538.0);
    }

    #[test]
    fn test_short_form_timestamps() {
        let items = parse_vtt("WEBVTT\n\n01:05.500 --> 01:07.000\nshort");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].offset, 65.5);
        assert_eq!(items[0].duration, 1.5);
    }

    #[test]
    fn test_drops_empty_blocks() {
        let body = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n<c> </c>\n\n00:00:02.000 --> 00:00:03.000\n\n00:00:03.000 --> 00:00:04.000\nkept\n";
        let items = parse_vtt(body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "kept");
    }

    #[test]
    fn test_no_cues() {
        assert!(parse_vtt("WEBVTT\n\n").is_empty());
        assert!(parse_vtt("").is_empty());
        assert!(parse_vtt("just some text\nwithout cues").is_empty());
    }
}
