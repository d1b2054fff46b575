//! Atomic JSON file cache.
//!
//! Holds the locally-cached subscription state and the last good usage
//! snapshot in `~/.config/publishlab/`. Writes go through a temp file with
//! fsync and an atomic rename so a crash mid-write never leaves a torn file.
//! Corrupt contents read back as "no cached state".

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreError;

/// Well-known cache key for the subscription state.
pub const SUBSCRIPTION_KEY: &str = "subscription";

/// Well-known cache key for the last resolved usage snapshot.
pub const USAGE_SNAPSHOT_KEY: &str = "usage_snapshot";

/// File-backed cache of small JSON documents, one file per key.
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    /// Open the cache at the default config location.
    pub fn new() -> Result<Self, CoreError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CoreError::LocalStore("could not determine config directory".into()))?
            .join("publishlab");
        Self::at_dir(dir)
    }

    /// Open the cache rooted at an explicit directory.
    pub fn at_dir(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CoreError::LocalStore(format!("failed to create cache dir: {}", e)))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Atomically write a value under a key.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let path = self.key_path(key);
        let temp_path = path.with_extension("tmp");

        let file = File::create(&temp_path)
            .map_err(|e| CoreError::LocalStore(format!("failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, value)?;

        writer
            .flush()
            .map_err(|e| CoreError::LocalStore(format!("failed to flush: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| CoreError::LocalStore(format!("failed to sync: {}", e)))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| CoreError::LocalStore(format!("failed to rename: {}", e)))?;

        Ok(())
    }

    /// Read a value back. Missing files and malformed JSON both read as
    /// `None`; malformed state is logged and discarded, never an error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.key_path(key);
        let file = File::open(&path).ok()?;

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = key, "Discarding malformed cached state: {}", e);
                None
            }
        }
    }

    /// Remove a cached value. Missing files are fine.
    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.key_path(key));
    }
}
