use serde_json::Value;

use super::{millis, TimedItem};

/// Parse a timed-text `fmt=json3` body (`{"events": [...]}`).
///
/// Each event's `segs[].utf8` are concatenated in order. A missing or zero
/// `dDurationMs` is inferred from the next event's `tStartMs`.
pub fn parse_json3(json: &Value) -> Vec<TimedItem> {
    let Some(events) = json.get("events").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut items = Vec::new();

    for (index, event) in events.iter().enumerate() {
        let Some(segs) = event.get("segs").and_then(Value::as_array) else {
            continue;
        };

        let raw: String = segs
            .iter()
            .filter_map(|seg| seg.get("utf8").and_then(Value::as_str))
            .collect();

        let start = millis(event.get("tStartMs")).unwrap_or(0.0);
        let mut duration = millis(event.get("dDurationMs")).unwrap_or(0.0);

        if duration == 0.0 {
            if let Some(next_start) = events
                .get(index + 1)
                .and_then(|next| millis(next.get("tStartMs")))
            {
                duration = next_start - start;
            }
        }

        if let Some(item) = TimedItem::from_raw(&raw, start / 1000.0, duration / 1000.0) {
            items.push(item);
        }
    }

    items
}
