/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Durable observation list over a pluggable key-value backend.
//!
//! The whole list lives as one JSON array under [`OBSERVATIONS_KEY`].
//!
//! # Policy
//!
//! - **Upsert**: [`ObservationStore::add`] replaces any observation with the
//!   same [`ObservationKey`] (lineage + bonus counts), keeping the original
//!   position. Last write wins.
//! - **Degraded load**: if the backend cannot be read or the stored JSON does
//!   not decode, the failure is logged and the store opens empty.
//! - **Write failures propagate**: `add` and `clear` return [`StoreError`] and
//!   leave the in-memory list as it was.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::string::String;
use std::vec::Vec;

use hashbrown::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::observation::{Observation, ObservationKey};

/// Key under which the observation list is stored.
pub const OBSERVATIONS_KEY: &str = "tier-calibration.observations";

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend I/O failed.
    #[error("storage I/O failed for key `{key}`: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The observation list could not be encoded or decoded.
    #[error("observation list encoding failed: {0}")]
    Codec(#[from] serde_json::Error),
}

// ─── Backends ────────────────────────────────────────────────────────────────

/// String key-value storage.
pub trait StorageBackend {
    /// Read a value. `Ok(None)` when the key has never been written.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Write a value, replacing any previous one.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process backend.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, for inspection.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Overwrite a raw value, bypassing encoding.
    pub fn put_raw(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.into(), value.into());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: io::Error) -> StoreError {
        StoreError::Io {
            key: key.into(),
            source,
        }
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        fs::write(self.path_for(key), value).map_err(|e| Self::io_error(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

// ─── ObservationStore ────────────────────────────────────────────────────────

/// Observation list with upsert semantics, persisted through a backend.
#[derive(Debug)]
pub struct ObservationStore<B: StorageBackend> {
    backend: B,
    observations: Vec<Observation>,
    index: HashMap<ObservationKey, usize>,
}

impl<B: StorageBackend> ObservationStore<B> {
    /// Open the store, loading any saved list.
    ///
    /// Never fails: unreadable or undecodable data is logged and treated as
    /// an empty list.
    pub fn open(backend: B) -> Self {
        let loaded = match backend.load(OBSERVATIONS_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<Vec<Observation>>(&text) {
                Ok(list) => list,
                Err(e) => {
                    warn!(error = %e, key = OBSERVATIONS_KEY, "stored observations do not decode; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, key = OBSERVATIONS_KEY, "failed to load observations; starting empty");
                Vec::new()
            }
        };

        let mut store = Self {
            backend,
            observations: Vec::with_capacity(loaded.len()),
            index: HashMap::new(),
        };
        for obs in loaded {
            store.upsert(obs);
        }
        debug!(count = store.observations.len(), "observation store opened");
        store
    }

    /// Insert or replace an observation and persist the list.
    ///
    /// Returns `true` when an existing observation was replaced.
    pub fn add(&mut self, observation: Observation) -> Result<bool, StoreError> {
        let key = observation.key();
        let previous = self.upsert(observation);
        let replaced = previous.is_some();

        if let Err(e) = self.persist() {
            match previous {
                Some(old) => {
                    let i = self.index[&key];
                    self.observations[i] = old;
                }
                None => {
                    self.observations.pop();
                    self.index.remove(&key);
                }
            }
            return Err(e);
        }
        Ok(replaced)
    }

    /// All observations in insertion order.
    pub fn list(&self) -> &[Observation] {
        &self.observations
    }

    /// Look up by upsert key.
    pub fn get(&self, key: &ObservationKey) -> Option<&Observation> {
        self.index.get(key).map(|&i| &self.observations[i])
    }

    /// Number of stored observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// `true` when no observations are stored.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Remove every observation, in memory and in the backend.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(OBSERVATIONS_KEY)?;
        self.observations.clear();
        self.index.clear();
        debug!("observation store cleared");
        Ok(())
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the store, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// In-memory upsert. Returns the replaced observation, if any.
    fn upsert(&mut self, observation: Observation) -> Option<Observation> {
        let key = observation.key();
        match self.index.get(&key) {
            Some(&i) => Some(core::mem::replace(&mut self.observations[i], observation)),
            None => {
                self.index.insert(key, self.observations.len());
                self.observations.push(observation);
                None
            }
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let text = serde_json::to_string(&self.observations)?;
        self.backend.save(OBSERVATIONS_KEY, &text)?;
        debug!(count = self.observations.len(), "observations saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Lineage;
    use crate::tier::Tier;

    #[test]
    fn test_upsert_keeps_position() {
        let mut store = ObservationStore::open(MemoryBackend::new());
        store.add(Observation::labeled(Lineage::uniform(0), Tier::Cross)).unwrap();
        store.add(Observation::labeled(Lineage::uniform(1), Tier::Circle)).unwrap();
        let replaced = store
            .add(Observation::labeled(Lineage::uniform(0), Tier::Star))
            .unwrap();

        assert!(replaced);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].correct_symbol, "☆");
        assert_eq!(store.list()[1].correct_symbol, "○");
    }

    #[test]
    fn test_duplicate_keys_in_saved_data_collapse() {
        let a = Observation::labeled(Lineage::uniform(2), Tier::Cross);
        let b = Observation::labeled(Lineage::uniform(2), Tier::Triangle);
        let mut backend = MemoryBackend::new();
        backend.put_raw(OBSERVATIONS_KEY, serde_json::to_string(&[a, b]).unwrap());

        let store = ObservationStore::open(backend);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].correct_symbol, "△");
    }

    #[test]
    fn test_file_backend_path() {
        let backend = FileBackend::new("/tmp/obs");
        assert_eq!(backend.path_for("k"), PathBuf::from("/tmp/obs/k.json"));
        assert_eq!(backend.dir(), Path::new("/tmp/obs"));
    }
}
