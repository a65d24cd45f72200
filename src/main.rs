use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ytscribe::cli::{Cli, Commands};
use ytscribe::config::Config;
use ytscribe::transcript::{NO_CAPTIONS_ERROR, NO_TRACKS_NOTE};
use ytscribe::utils::format_duration;
use ytscribe::{output, server, TranscriptPipeline, TranscriptResult};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "ytscribe=debug" } else { "ytscribe=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Fetch {
            video,
            output,
            format,
            language,
            timestamps,
        } => {
            let pipeline = TranscriptPipeline::new(&config)?;

            tracing::info!("Fetching transcript for: {}", video);

            let progress = spinner(cli.quiet, "Fetching captions...")?;
            let result = pipeline.get_transcript(&video, language.as_deref()).await;
            let result = match result {
                Ok(result) => {
                    progress.finish_and_clear();
                    result
                }
                Err(e) => {
                    progress.abandon_with_message("Fetch failed");
                    return Err(e.into());
                }
            };

            match &result {
                TranscriptResult::Found { items, source } => {
                    let covered = items.last().map(|item| item.end()).unwrap_or(0.0);
                    tracing::info!(
                        "{} cue(s) via {}, covering {}",
                        items.len(),
                        source.as_str(),
                        format_duration(covered)
                    );
                }
                TranscriptResult::NoTracks => eprintln!("{}", NO_TRACKS_NOTE),
                TranscriptResult::NoCaptions => eprintln!("{}", NO_CAPTIONS_ERROR),
            }

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, &format, timestamps)?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&result, &format, timestamps)?;
                }
            }
        }
        Commands::Tracks { video } => {
            let pipeline = TranscriptPipeline::new(&config)?;
            let tracks = pipeline.list_tracks(&video).await?;

            if tracks.is_empty() {
                println!("{}", NO_TRACKS_NOTE);
            }

            for track in &tracks {
                println!(
                    "{:<8} {:<8} {:<8} {}",
                    track.language_code,
                    if track.is_auto_generated() { "asr" } else { "manual" },
                    if track.is_default { "default" } else { "" },
                    track.display_name().unwrap_or_default()
                );
            }
        }
        Commands::Serve { bind, port } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let port = port.unwrap_or(config.server.port);
            server::run_server(&config, &bind, port).await?;
        }
        Commands::Config { show, init } => {
            if init {
                let path = Config::user_config_path()
                    .context("Could not determine the user configuration directory")?;
                config.save_to(&path)?;
                println!("Configuration written to: {}", path.display());
            } else if show {
                config.display();
            } else {
                println!("Use --show to display the configuration or --init to write the defaults.");
            }
        }
    }

    Ok(())
}

fn spinner(quiet: bool, message: &'static str) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    Ok(progress)
}
