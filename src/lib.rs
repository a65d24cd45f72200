//! YTScribe - retrieve timed caption tracks from YouTube without an official transcript API
//!
//! This library scrapes the watch page for the embedded client configuration and player
//! state, picks a caption track, and then walks an ordered chain of upstream surfaces
//! (the internal `youtubei` transcript RPC, then the legacy timed-text endpoint in several
//! encodings) until one of them yields a non-empty transcript.

pub mod cli;
pub mod config;
pub mod http;
pub mod identifier;
pub mod output;
pub mod parsers;
pub mod server;
pub mod tracks;
pub mod transcript;
pub mod utils;
pub mod watch;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use http::{BrowserProfile, HttpReply, HttpRequest, ReqwestTransport, Transport};
pub use identifier::VideoId;
pub use parsers::TimedItem;
pub use tracks::CaptionTrack;
pub use transcript::{Source, TranscriptPipeline, TranscriptResult};

/// Result type used by the acquisition pipeline
pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Error types specific to transcript acquisition
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid video identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Region/consent gating. Try again or from a different region.")]
    RegionGated,

    #[error("Upstream request failed: {0}")]
    UpstreamTransport(String),

    #[error("Upstream {stage} returned HTTP {status}")]
    UpstreamStatus { stage: &'static str, status: u16 },

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("{0}")]
    Unexpected(String),
}
