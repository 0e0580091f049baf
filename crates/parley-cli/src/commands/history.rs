//! History command handler

use anyhow::{Context, Result};

use parley_core::{CacheStore, Config, FileCacheStore};

use crate::output::Output;

/// Show the cached message history, newest first
pub fn run(config: &Config, limit: Option<usize>, output: &Output) -> Result<()> {
    let cache = FileCacheStore::new(config.cache_path());
    let messages = cache
        .load()
        .context("Failed to read the cached message snapshot")?;

    let messages = match limit {
        Some(n) => &messages[..n.min(messages.len())],
        None => &messages[..],
    };

    output.print_messages(messages);
    Ok(())
}
