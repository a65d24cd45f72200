use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use super::TimedItem;

/// Timing units of the two timed-text XML layouts
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// `<text start="1.5" dur="2.0">` in seconds
    Seconds,
    /// `<p t="1500" d="2000">` in milliseconds
    Millis,
}

struct OpenCue {
    layout: Layout,
    start: f64,
    duration: f64,
    text: String,
}

/// Parse a timed-text XML body (`srv1` `<text>` or `srv3` `<p>` cues).
///
/// Parsing stops quietly at the first malformed XML event; cues read so far are kept.
pub fn parse_timedtext_xml(body: &str) -> Vec<TimedItem> {
    let mut reader = Reader::from_str(body);
    let mut items = Vec::new();
    let mut open: Option<OpenCue> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if let Some(layout) = cue_layout(e) {
                    open = Some(open_cue(e, layout));
                }
            }
            Ok(Event::Empty(ref e)) => {
                // <br/> inside a cue separates lines
                if let Some(cue) = open.as_mut() {
                    if e.name().as_ref() == b"br" {
                        cue.text.push(' ');
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(cue) = open.as_mut() {
                    cue.text.push_str(&decode_text(e));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(cue) = open.as_mut() {
                    cue.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::End(ref e)) => {
                let closes_cue = matches!(
                    (open.as_ref().map(|cue| cue.layout), e.name().as_ref()),
                    (Some(Layout::Seconds), b"text") | (Some(Layout::Millis), b"p")
                );
                if closes_cue {
                    if let Some(cue) = open.take() {
                        if let Some(item) = TimedItem::from_raw(&cue.text, cue.start, cue.duration) {
                            items.push(item);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("Stopping timed-text XML parse: {}", e);
                break;
            }
            _ => {}
        }
    }

    items
}

/// Decode a text run; caption text is commonly escaped twice.
///
/// quick-xml only knows the XML entities, so runs carrying HTML ones (`&nbsp;`,
/// `&eacute;`) are decoded from the raw bytes instead.
fn decode_text(e: &BytesText) -> String {
    let once = match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(_) => html_escape::decode_html_entities(&String::from_utf8_lossy(e)).into_owned(),
    };
    html_escape::decode_html_entities(&once).into_owned()
}

fn cue_layout(e: &BytesStart) -> Option<Layout> {
    match e.name().as_ref() {
        b"text" => Some(Layout::Seconds),
        b"p" => Some(Layout::Millis),
        _ => None,
    }
}

fn open_cue(e: &BytesStart, layout: Layout) -> OpenCue {
    let (start_key, duration_key, scale): (&[u8], &[u8], f64) = match layout {
        Layout::Seconds => (b"start", b"dur", 1.0),
        Layout::Millis => (b"t", b"d", 1000.0),
    };

    let mut start = 0.0;
    let mut duration = 0.0;
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
        match attr.key.as_ref() {
            key if key == start_key => start = value.unwrap_or(0.0) / scale,
            key if key == duration_key => duration = value.unwrap_or(0.0) / scale,
            _ => {}
        }
    }

    OpenCue {
        layout,
        start,
        duration,
        text: String::new(),
    }
}
