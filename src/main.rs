use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use podback::opml::{self, LoadError};

#[derive(Parser, Debug)]
#[command(
    name = "podback",
    about = "Parses an Overcast \"All data\" OPML backup into playlists, feeds, and episodes"
)]
struct Args {
    /// Path to the exported backup file
    file: Option<PathBuf>,

    /// Don't warn about attributes the schemas don't parse yet
    #[arg(long)]
    no_warn_unknown: bool,
}

fn main() -> Result<()> {
    // Default to "warn" so validation errors and drift warnings reach the
    // user without RUST_LOG set. Logs go to stderr; stdout carries only the
    // JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // No path argument: nothing to report.
    let Some(path) = args.file else {
        return Ok(());
    };

    if !path.exists() {
        eprintln!("File {} doesn't exist, bailing", path.display());
        return Ok(());
    }

    let export = match opml::load_file(&path, !args.no_warn_unknown) {
        Ok(export) => export,
        Err(err @ LoadError::MissingSection(_)) => {
            tracing::error!(path = %path.display(), error = %err, "Backup is structurally invalid");
            std::process::exit(1);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to parse {}", path.display()))
        }
    };

    tracing::info!(
        playlists = export.playlists.len(),
        feeds = export.feeds.len(),
        episodes = export
            .feeds
            .iter()
            .map(|feed| feed.episodes.len())
            .sum::<usize>(),
        "Parsed backup"
    );

    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
