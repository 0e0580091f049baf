//! Parley CLI
//!
//! Command-line client for Parley - offline-tolerant chat over a shared
//! message feed.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use parley_core::{Config, Coordinates, Draft};

mod commands;
mod output;
mod session;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Parley - offline-tolerant chat for the terminal")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Work against the cached list only, without dialing the feed
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message
    Send {
        /// Message text
        text: Option<String>,
        /// Attach an image by URI
        #[arg(long)]
        image: Option<String>,
        /// Share a location (used with --longitude)
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,
        /// Share a location (used with --latitude)
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,
    },
    /// Show the cached message history
    #[command(alias = "ls")]
    History {
        /// Show at most this many messages
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Delete a message
    #[command(alias = "rm")]
    Delete {
        /// Message ID
        id: Uuid,
    },
    /// Follow the live message list
    Watch,
    /// Show feed, cache and connectivity status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, feed_url, channel, author_name)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    init_logging();

    // Config commands don't need the engine or the data directory
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, &output),
        };
    }

    let config = Config::load()?;

    match cli.command {
        Commands::Send {
            text,
            image,
            latitude,
            longitude,
        } => {
            let draft = build_draft(text, image, latitude, longitude)?;
            commands::send::run(config, draft, cli.offline, &output).await
        }
        Commands::History { limit } => commands::history::run(&config, limit, &output),
        Commands::Delete { id } => commands::delete::run(config, id, cli.offline, &output).await,
        Commands::Watch => commands::watch::run(config, cli.offline, &output).await,
        Commands::Status => commands::status::show(&config, cli.offline, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Assemble a draft from the send arguments
fn build_draft(
    text: Option<String>,
    image: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Draft> {
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let draft = Draft {
        text,
        image,
        location,
    };
    if draft.is_empty() {
        anyhow::bail!("Nothing to send. Provide text, --image, or --latitude/--longitude.");
    }
    Ok(draft)
}

/// Initialize logging to stderr (only if PARLEY_LOG is set)
fn init_logging() {
    let Ok(log_level) = std::env::var("PARLEY_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "parley_core={},parley_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_draft_requires_a_payload() {
        assert!(build_draft(None, None, None, None).is_err());
    }

    #[test]
    fn test_build_draft_text() {
        let draft = build_draft(Some("hi".to_string()), None, None, None).unwrap();
        assert_eq!(draft.text.as_deref(), Some("hi"));
        assert!(draft.location.is_none());
    }

    #[test]
    fn test_build_draft_location() {
        let draft = build_draft(None, None, Some(48.85), Some(2.35)).unwrap();
        let location = draft.location.unwrap();
        assert_eq!(location.latitude, 48.85);
        assert_eq!(location.longitude, 2.35);
    }
}
