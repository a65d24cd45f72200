use std::fmt;
use url::Url;

const SHORT_LINK_HOST: &str = "youtu.be";

/// Path prefixes whose next segment is the video id
const ID_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

/// Segments after a prefix that name a player mode rather than a video
const RESERVED_SEGMENTS: &[&str] = &["videoseries"];

/// Minimum length of a bare video id
const MIN_ID_LEN: usize = 10;

/// Canonical YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Normalize a bare id or one of the supported URL shapes.
    ///
    /// Accepts `ID`, `https://www.youtube.com/watch?v=ID`, `https://youtu.be/ID`,
    /// `https://www.youtube.com/shorts/ID` (and the `/embed/`, `/live/`, `/v/` variants).
    /// Scheme-less platform URLs are accepted too. Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        let input = raw.trim();

        if is_id_shape(input) {
            return Some(Self(input.to_string()));
        }

        let url_str = if input.starts_with("http://") || input.starts_with("https://") {
            input.to_string()
        } else if input.contains("youtube.com") || input.contains(SHORT_LINK_HOST) {
            format!("https://{}", input)
        } else {
            return None;
        };

        let url = Url::parse(&url_str).ok()?;
        let candidate = id_from_url(&url)?;

        is_id_shape(&candidate).then(|| Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    if host == SHORT_LINK_HOST || host.ends_with(".youtu.be") {
        return segments.next().map(str::to_string);
    }

    let segments: Vec<&str> = segments.collect();
    if let Some(pos) = segments
        .iter()
        .position(|segment| ID_PATH_PREFIXES.contains(segment))
    {
        if let Some(id) = segments.get(pos + 1).filter(|id| !RESERVED_SEGMENTS.contains(*id)) {
            return Some(id.to_string());
        }
    }

    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

fn is_id_shape(s: &str) -> bool {
    s.len() >= MIN_ID_LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "iG9CE55wbtY";

    #[test]
    fn test_all_shapes_normalize_to_same_id() {
        let inputs = [
            ID.to_string(),
            format!("  {}  ", ID),
            format!("https://www.youtube.com/watch?v={}", ID),
            format!("https://www.youtube.com/watch?feature=share&v={}&t=42s", ID),
            format!("https://youtu.be/{}", ID),
            format!("https://youtu.be/{}?si=abcdef", ID),
            format!("https://www.youtube.com/shorts/{}", ID),
            format!("https://m.youtube.com/shorts/{}/", ID),
            format!("https://www.youtube.com/embed/{}", ID),
            format!("youtube.com/watch?v={}", ID),
            format!("youtu.be/{}", ID),
        ];

        for input in inputs {
            let id = VideoId::parse(&input).unwrap_or_else(|| panic!("failed on {}", input));
            assert_eq!(id.as_str(), ID, "input: {}", input);
        }
    }

    #[test]
    fn test_rejects_unresolvable_input() {
        assert!(VideoId::parse("").is_none());
        assert!(VideoId::parse("short").is_none());
        assert!(VideoId::parse("not a video id at all").is_none());
        assert!(VideoId::parse("https://www.youtube.com/feed/trending").is_none());
        assert!(VideoId::parse("https://www.youtube.com/watch?v=").is_none());
        assert!(VideoId::parse("https://youtu.be/").is_none());
        assert!(VideoId::parse("https://example.com/page").is_none());
        assert!(VideoId::parse("https://www.youtube.com/embed/videoseries?list=PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG").is_none());
    }

    #[test]
    fn test_rejects_malformed_token_in_url() {
        assert!(VideoId::parse("https://www.youtube.com/watch?v=bad<id>value").is_none());
    }

    #[test]
    fn test_bare_id_with_dash_and_underscore() {
        let id = VideoId::parse("a-b_c-d_e-f").unwrap();
        assert_eq!(id.to_string(), "a-b_c-d_e-f");
    }
}
