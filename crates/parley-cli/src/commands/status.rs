//! Status command handler

use anyhow::Result;

use parley_core::{CacheStore, Config, ConnectivityState, FileCacheStore};

use crate::output::{Output, OutputFormat};
use crate::session;

/// Show feed, cache and connectivity status
pub fn show(config: &Config, offline: bool, output: &Output) -> Result<()> {
    let cache = FileCacheStore::new(config.cache_path());
    let cached = cache.load().unwrap_or_default();
    let newest = cached.first().map(|m| m.created_at);

    let mode = match session::connectivity(config, offline) {
        ConnectivityState::Online => "online",
        ConnectivityState::Offline => "offline",
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "mode": mode,
                    "feed_url": config.feed_url,
                    "channel": config.channel,
                    "cache": {
                        "path": config.cache_path(),
                        "messages": cached.len(),
                        "newest": newest.map(|t| t.to_rfc3339())
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", cached.len());
        }
        OutputFormat::Human => {
            println!("Parley Status");
            println!("=============");
            println!();
            println!("Feed:");
            println!("  Mode:    {}", mode);
            println!(
                "  URL:     {}",
                config.feed_url.as_deref().unwrap_or("(not set)")
            );
            println!("  Channel: {}", config.channel);
            println!();
            println!("Cache:");
            println!("  Location: {}", config.cache_path().display());
            println!("  Messages: {}", cached.len());
            if let Some(newest) = newest {
                println!("  Newest:   {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }
    }

    Ok(())
}
