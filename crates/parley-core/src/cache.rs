//! Local message cache
//!
//! Persists the last known message list so the client can present and
//! extend it while offline. The snapshot is overwritten wholesale on
//! every update and survives process restarts.
//!
//! Writes are atomic (write to temp file, sync, rename) so a failed
//! write never corrupts a previously valid snapshot.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::models::Message;

/// Durable store for the cached message snapshot
///
/// `load` returns an empty list when no snapshot has been saved yet;
/// a missing snapshot is not an error.
pub trait CacheStore: Send + Sync {
    /// Overwrite the persisted snapshot
    fn save(&self, messages: &[Message]) -> Result<(), CacheError>;

    /// Return the last saved snapshot, or an empty list if none exists
    fn load(&self) -> Result<Vec<Message>, CacheError>;
}

/// File-backed cache store
///
/// One JSON file holding the full ordered message array.
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    /// Create a store persisting to the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileCacheStore {
    fn save(&self, messages: &[Message]) -> Result<(), CacheError> {
        let data = serde_json::to_vec_pretty(messages).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, source),
        })?;

        atomic_write(&self.path, &data).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn load(&self) -> Result<Vec<Message>, CacheError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).map_err(|source| CacheError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_slice(&data).map_err(|source| CacheError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), std::io::Error> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;

    // Sync to disk before rename
    file.sync_all()?;

    // Atomic rename
    fs::rename(&temp_path, path)?;

    Ok(())
}
