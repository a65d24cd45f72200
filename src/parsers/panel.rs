use serde_json::Value;

use super::{millis, TimedItem};

/// Root of the transcript renderer inside a `get_transcript` response
const RENDERER_PATH: &str = "/actions/0/updateEngagementPanelAction/content/transcriptRenderer";
/// Cue groups layout, relative to the renderer
const CUE_GROUPS_PATH: &str = "/body/transcriptBodyRenderer/cueGroups";
/// Segment list layout, relative to the renderer
const SEGMENTS_PATH: &str =
    "/content/transcriptSearchPanelRenderer/body/transcriptSegmentListRenderer/initialSegments";

/// Parse a `youtubei/v1/get_transcript` response body.
pub fn parse_transcript_panel(json: &Value) -> Vec<TimedItem> {
    let Some(renderer) = json.pointer(RENDERER_PATH) else {
        return Vec::new();
    };

    if let Some(groups) = renderer.pointer(CUE_GROUPS_PATH).and_then(Value::as_array) {
        return parse_cue_groups(groups);
    }

    if let Some(segments) = renderer.pointer(SEGMENTS_PATH).and_then(Value::as_array) {
        return parse_segments(segments);
    }

    Vec::new()
}

fn parse_cue_groups(groups: &[Value]) -> Vec<TimedItem> {
    groups
        .iter()
        .filter_map(|group| group.pointer("/transcriptCueGroupRenderer/cues")?.as_array())
        .flatten()
        .filter_map(|cue| cue.get("transcriptCueRenderer"))
        .filter_map(|cue| {
            let raw = cue
                .get("cue")
                .and_then(display_text)
                .filter(|text| !text.trim().is_empty())
                .or_else(|| cue.get("simpleText").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_default();
            let start = millis(cue.get("startOffsetMs")).unwrap_or(0.0);
            let duration = millis(cue.get("durationMs")).unwrap_or(0.0);

            TimedItem::from_raw(&raw, start / 1000.0, duration / 1000.0)
        })
        .collect()
}

fn parse_segments(segments: &[Value]) -> Vec<TimedItem> {
    segments
        .iter()
        .filter_map(|segment| segment.get("transcriptSegmentRenderer"))
        .filter_map(|segment| {
            let raw = segment.get("snippet").and_then(display_text).unwrap_or_default();
            let start = millis(segment.get("startMs")).unwrap_or(0.0);
            let end = millis(segment.get("endMs")).unwrap_or(start);

            TimedItem::from_raw(&raw, start / 1000.0, (end - start) / 1000.0)
        })
        .collect()
}

/// Text of a formatted-string node: `simpleText`, or the concatenated `runs`
fn display_text(node: &Value) -> Option<String> {
    if let Some(text) = node.get("simpleText").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let runs = node.get("runs")?.as_array()?;
    Some(
        runs.iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cue(text: Value, start: &str, duration: &str) -> Value {
        json!({
            "transcriptCueGroupRenderer": {
                "cues": [{
                    "transcriptCueRenderer": {
                        "cue": text,
                        "startOffsetMs": start,
                        "durationMs": duration
                    }
                }]
            }
        })
    }

    fn response(groups: Vec<Value>) -> Value {
        json!({
            "actions": [{
                "updateEngagementPanelAction": {
                    "content": {
                        "transcriptRenderer": {
                            "body": { "transcriptBodyRenderer": { "cueGroups": groups } }
                        }
                    }
                }
            }]
        })
    }

    #[test]
    fn test_parses_cue_groups() {
        let body = response(vec![
            cue(json!({ "simpleText": "Hello   there" }), "0", "1500"),
            cue(json!({ "runs": [{ "text": "general " }, { "text": "kenobi" }] }), "1500", "2000"),
        ]);

        let items = parse_transcript_panel(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], TimedItem { text: "Hello there".into(), offset: 0.0, duration: 1.5 });
        assert_eq!(items[1].text, "general kenobi");
        assert_eq!(items[1].offset, 1.5);
        assert_eq!(items[1].duration, 2.0);
    }

    #[test]
    fn test_falls_back_to_plain_simple_text() {
        let body = response(vec![json!({
            "transcriptCueGroupRenderer": {
                "cues": [{ "transcriptCueRenderer": { "simpleText": "fallback", "startOffsetMs": 3000 } }]
            }
        })]);

        let items = parse_transcript_panel(&body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "fallback");
        assert_eq!(items[0].offset, 3.0);
        assert_eq!(items[0].duration, 0.0);
    }

    #[test]
    fn test_empty_runs_fall_back_to_plain_simple_text() {
        let body = response(vec![json!({
            "transcriptCueGroupRenderer": {
                "cues": [{ "transcriptCueRenderer": {
                    "cue": { "runs": [] },
                    "simpleText": "fallback",
                    "startOffsetMs": "500",
                    "durationMs": "1000"
                } }]
            }
        })]);

        let items = parse_transcript_panel(&body);
        assert_eq!(items, vec![TimedItem { text: "fallback".into(), offset: 0.5, duration: 1.0 }]);
    }

    #[test]
    fn test_drops_empty_and_malformed_cues() {
        let body = response(vec![
            cue(json!({ "simpleText": "kept" }), "0", "1000"),
            cue(json!({ "simpleText": "   " }), "1000", "1000"),
            json!({ "transcriptCueGroupRenderer": { "cues": "not a list" } }),
            json!({ "somethingElse": {} }),
            cue(json!(42), "2000", "1000"),
        ]);

        let items = parse_transcript_panel(&body);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "kept");
    }

    #[test]
    fn test_empty_payloads() {
        assert!(parse_transcript_panel(&response(vec![])).is_empty());
        assert!(parse_transcript_panel(&json!({})).is_empty());
        assert!(parse_transcript_panel(&json!({ "actions": [] })).is_empty());
    }

    #[test]
    fn test_parses_segment_list_layout() {
        let body = json!({
            "actions": [{
                "updateEngagementPanelAction": {
                    "content": {
                        "transcriptRenderer": {
                            "content": {
                                "transcriptSearchPanelRenderer": {
                                    "body": {
                                        "transcriptSegmentListRenderer": {
                                            "initialSegments": [
                                                { "transcriptSectionHeaderRenderer": {} },
                                                { "transcriptSegmentRenderer": {
                                                    "startMs": "1000", "endMs": "3500",
                                                    "snippet": { "runs": [{ "text": "segment text" }] }
                                                } }
                                            ]
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }]
        });

        let items = parse_transcript_panel(&body);
        assert_eq!(items, vec![TimedItem { text: "segment text".into(), offset: 1.0, duration: 2.5 }]);
    }
}
