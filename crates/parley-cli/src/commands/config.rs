//! Config command handlers

use anyhow::{bail, Context, Result};

use parley_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "feed_url": config.feed_url,
                    "channel": config.channel,
                    "author_id": config.author_id,
                    "author_name": config.author_name
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:    {}", config.data_dir.display());
            println!(
                "  feed_url:    {}",
                config.feed_url.as_deref().unwrap_or("(not set)")
            );
            println!("  channel:     {}", config.channel);
            println!(
                "  author_id:   {}",
                config.author_id.as_deref().unwrap_or("(generated on first send)")
            );
            println!(
                "  author_name: {}",
                config.author_name.as_deref().unwrap_or("(not set)")
            );
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match key.as_str() {
        "data_dir" => {
            config.data_dir = value.clone().into();
        }
        "feed_url" => {
            config.feed_url = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.clone())
            };
        }
        "channel" => {
            if value.is_empty() {
                bail!("The channel cannot be empty.");
            }
            config.channel = value.clone();
        }
        "author_name" => {
            config.author_name = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.clone())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, feed_url, channel, author_name",
                key
            );
        }
    }

    config.save().context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
