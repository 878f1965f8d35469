//! Integration tests for the persistent observation store.
//!
//! Run with: `cargo test --features store`

#![cfg(feature = "store")]

use std::cell::Cell;

use tier_calibration::store::{
    FileBackend, MemoryBackend, ObservationStore, StorageBackend, StoreError, OBSERVATIONS_KEY,
};
use tier_calibration::{Lineage, Observation, Tier};

// ─── helpers ─────────────────────────────────────────────────────────────────

fn obs(id: usize, tier: Tier) -> Observation {
    Observation::labeled(Lineage::uniform(id), tier)
}

/// Backend whose reads always fail and whose writes fail on demand.
#[derive(Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    fail_writes: Cell<bool>,
}

fn io_failure(key: &str) -> StoreError {
    StoreError::Io {
        key: key.into(),
        source: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
    }
}

impl StorageBackend for FlakyBackend {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(io_failure(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(io_failure(key));
        }
        self.inner.save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(io_failure(key));
        }
        self.inner.remove(key)
    }
}

// ─── tests ───────────────────────────────────────────────────────────────────

#[test]
fn test_add_persists_and_reopens() {
    let mut store = ObservationStore::open(MemoryBackend::new());
    store.add(obs(0, Tier::Cross)).unwrap();
    store.add(obs(1, Tier::Star).with_bonuses(1, 1)).unwrap();

    let reopened = ObservationStore::open(store.into_backend());
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.list()[1].s3, 1);
    assert_eq!(reopened.list()[1].expected_tier(), Some(Tier::Star));
}

#[test]
fn test_upsert_is_last_write_wins() {
    let mut store = ObservationStore::open(MemoryBackend::new());
    assert!(!store.add(obs(4, Tier::Cross)).unwrap());
    assert!(store.add(obs(4, Tier::Circle).with_noble(3.0)).unwrap());

    assert_eq!(store.len(), 1);
    let stored = store.get(&obs(4, Tier::Cross).key()).unwrap();
    assert_eq!(stored.correct_symbol, "○");
    assert_eq!(stored.noble, Some(3.0));
}

#[test]
fn test_bonus_counts_are_part_of_the_key() {
    let mut store = ObservationStore::open(MemoryBackend::new());
    store.add(obs(2, Tier::Cross)).unwrap();
    store.add(obs(2, Tier::Cross).with_bonuses(0, 1)).unwrap();
    store.add(obs(2, Tier::Cross).with_bonuses(1, 0)).unwrap();
    assert_eq!(store.len(), 3);
}

#[test]
fn test_clear_removes_everything() {
    let mut store = ObservationStore::open(MemoryBackend::new());
    store.add(obs(0, Tier::Cross)).unwrap();
    store.clear().unwrap();
    assert!(store.is_empty());
    assert_eq!(store.backend().raw(OBSERVATIONS_KEY), None);

    let reopened = ObservationStore::open(store.into_backend());
    assert!(reopened.is_empty());
}

#[test]
fn test_load_failure_degrades_to_empty() {
    let store = ObservationStore::open(FlakyBackend::default());
    assert!(store.is_empty());
}

#[test]
fn test_corrupt_data_degrades_to_empty() {
    let mut backend = MemoryBackend::new();
    backend.put_raw(OBSERVATIONS_KEY, "{ not json");
    let mut store = ObservationStore::open(backend);
    assert!(store.is_empty());

    // the store stays usable and overwrites the corrupt value
    store.add(obs(1, Tier::Triangle)).unwrap();
    let reopened = ObservationStore::open(store.into_backend());
    assert_eq!(reopened.len(), 1);
}

#[test]
fn test_failed_write_leaves_memory_unchanged() {
    let mut store = ObservationStore::open(FlakyBackend::default());
    store.add(obs(0, Tier::Cross)).unwrap();

    store.backend().fail_writes.set(true);
    assert!(store.add(obs(1, Tier::Star)).is_err());
    assert!(store.add(obs(0, Tier::Star)).is_err());
    assert!(store.clear().is_err());

    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].correct_symbol, "×");
}

#[test]
fn test_file_backend_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("nested");

    let mut store = ObservationStore::open(FileBackend::new(&root));
    assert!(store.is_empty());
    store.add(obs(3, Tier::DoubleCircle).with_bonuses(2, 0)).unwrap();
    store.add(obs(5, Tier::FilledTriangle)).unwrap();

    assert!(FileBackend::new(&root).path_for(OBSERVATIONS_KEY).exists());

    let reopened = ObservationStore::open(FileBackend::new(&root));
    assert_eq!(reopened.list(), store.list());

    let mut reopened = reopened;
    reopened.clear().unwrap();
    assert!(!reopened.backend().path_for(OBSERVATIONS_KEY).exists());
    // clearing an already-missing file is fine
    reopened.clear().unwrap();
}
