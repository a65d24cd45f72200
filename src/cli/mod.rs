use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytscribe",
    about = "YTScribe - Fetch timed YouTube captions without an official transcript API",
    version,
    long_about = "Retrieves the caption track of a YouTube video by scraping the watch page and trying the internal transcript endpoint, then the legacy timed-text endpoint in several encodings. Can also run as a small HTTP API."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the transcript of a video
    Fetch {
        /// Video id or YouTube URL (watch, youtu.be, shorts)
        #[arg(value_name = "ID_OR_URL")]
        video: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Preferred caption language (e.g. en, fr, pt-BR; "auto" for the default track)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Include timestamps in text output (srt/vtt formats always include timestamps)
        #[arg(long)]
        timestamps: bool,
    },

    /// List the caption tracks a video advertises
    Tracks {
        /// Video id or YouTube URL
        #[arg(value_name = "ID_OR_URL")]
        video: String,
    },

    /// Serve the transcript API over HTTP
    Serve {
        /// Listen address (defaults to the configured bind address)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Listen port (defaults to the configured port)
        #[arg(short, long, env = "PORT", value_name = "PORT")]
        port: Option<u16>,
    },

    /// Show or initialise the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration to the user config directory
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON response body
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from(["ytscribe", "fetch", "iG9CE55wbtY", "-l", "fr", "-f", "srt"]).unwrap();
        match cli.command {
            Commands::Fetch { video, language, format, .. } => {
                assert_eq!(video, "iG9CE55wbtY");
                assert_eq!(language.as_deref(), Some("fr"));
                assert!(matches!(format, OutputFormat::Srt));
            }
            _ => panic!("expected fetch"),
        }
    }
}
