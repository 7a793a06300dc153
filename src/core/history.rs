//! Translation history
//!
//! Bounded, newest-first log of successful exchanges. Every mutation is
//! written through to a [`KeyValueStore`]; durability failures are logged and
//! never surfaced.

pub mod storage;

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::shared::types::TranslationRecord;
pub use storage::{InMemoryStorage, KeyValueStore, RedbStorage};

/// Maximum number of records retained
pub const MAX_HISTORY_SIZE: usize = 50;

/// Well-known storage key holding the JSON-encoded log
pub const HISTORY_KEY: &str = "translationHistory";

pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    records: Vec<TranslationRecord>,
    durable: bool,
}

impl HistoryStore {
    /// Open the on-disk store at `path`, falling back to memory if it cannot be opened
    pub fn open(path: &Path) -> Self {
        let storage: Arc<dyn KeyValueStore> = match RedbStorage::open(path) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to open history database, using in-memory fallback");
                Arc::new(InMemoryStorage::new())
            }
        };
        Self::load(storage)
    }

    /// Read the persisted log. Absent or corrupt data yields an empty log.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let records = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<TranslationRecord>>(&raw) {
                Ok(mut records) => {
                    records.truncate(MAX_HISTORY_SIZE);
                    records
                }
                Err(e) => {
                    warn!(error = %e, "persisted history is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted history, starting empty");
                Vec::new()
            }
        };

        debug!(count = records.len(), "history loaded");

        Self {
            storage,
            records,
            durable: true,
        }
    }

    pub fn in_memory() -> Self {
        Self::load(Arc::new(InMemoryStorage::new()))
    }

    /// Newest first
    pub fn records(&self) -> &[TranslationRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&TranslationRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// False once a durable write has failed; the log then lives in memory only
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Insert at the front, evicting the oldest records beyond the cap
    pub fn append(&mut self, record: TranslationRecord) {
        debug!(id = %record.id, "appending history record");
        self.records.insert(0, record);
        if self.records.len() > MAX_HISTORY_SIZE {
            self.records.truncate(MAX_HISTORY_SIZE);
        }
        self.persist();
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Empty the log and delete the persisted entry. The delete is attempted
    /// even after a failed write so an older log cannot resurface on restart.
    pub fn clear(&mut self) {
        self.records.clear();
        match self.storage.remove(HISTORY_KEY) {
            Ok(()) => info!("cleared translation history"),
            Err(e) if self.durable => self.degrade(e),
            Err(e) => warn!(error = %e, "failed to delete persisted history"),
        }
    }

    /// Write the current log to durable storage
    pub fn persist(&mut self) {
        if !self.durable {
            return;
        }
        let encoded = match serde_json::to_string(&self.records) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "failed to encode history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &encoded) {
            self.degrade(e);
        }
    }

    fn degrade(&mut self, error: crate::shared::error::AppError) {
        warn!(error = %error, "history write failed, continuing in memory for this session");
        self.durable = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::{AppError, AppResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(text: &str) -> TranslationRecord {
        TranslationRecord::new(text, format!("{} (pt)", text), "en", "pt")
    }

    /// Accepts reads, fails every write
    #[derive(Default)]
    struct FailingStorage {
        writes: AtomicUsize,
    }

    impl KeyValueStore for FailingStorage {
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Storage("disk full".to_string()))
        }
        fn remove(&self, _key: &str) -> AppResult<()> {
            Err(AppError::Storage("disk full".to_string()))
        }
    }

    /// Real storage that starts refusing writes after `allowed_writes`; removes always work
    struct WriteLimitedStorage {
        inner: InMemoryStorage,
        allowed_writes: usize,
        writes: AtomicUsize,
    }

    impl KeyValueStore for WriteLimitedStorage {
        fn get(&self, key: &str) -> AppResult<Option<String>> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> AppResult<()> {
            if self.writes.fetch_add(1, Ordering::SeqCst) >= self.allowed_writes {
                return Err(AppError::Storage("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> AppResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_append_newest_first() {
        let mut history = HistoryStore::in_memory();
        history.append(record("first"));
        history.append(record("second"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].source_text, "second");
        assert_eq!(history.records()[1].source_text, "first");
    }

    #[test]
    fn test_max_history_size() {
        let mut history = HistoryStore::in_memory();
        for i in 0..MAX_HISTORY_SIZE {
            history.append(record(&format!("item {}", i)));
        }
        let oldest = history.records().last().unwrap().id.clone();

        history.append(record("overflow"));

        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(history.records()[0].source_text, "overflow");
        assert!(history.get(&oldest).is_none());
        assert_eq!(history.records().last().unwrap().source_text, "item 1");
    }

    #[test]
    fn test_remove_exactly_one() {
        let mut history = HistoryStore::in_memory();
        history.append(record("a"));
        history.append(record("b"));
        history.append(record("c"));
        let target = history.records()[1].id.clone();

        assert!(history.remove(&target));
        assert_eq!(history.len(), 2);
        assert!(history.get(&target).is_none());
        let texts: Vec<_> = history.records().iter().map(|r| r.source_text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a"]);

        assert!(!history.remove("not-there"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_mutations_are_persisted_and_reloaded() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let mut history = HistoryStore::load(Arc::clone(&storage));
        history.append(record("hello"));
        history.append(record("world"));

        let reloaded = HistoryStore::load(Arc::clone(&storage));
        assert_eq!(reloaded.records(), history.records());
    }

    #[test]
    fn test_clear_removes_persisted_entry() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let mut history = HistoryStore::load(Arc::clone(&storage));
        history.append(record("hello"));
        assert!(storage.get(HISTORY_KEY).unwrap().is_some());

        history.clear();

        assert!(history.is_empty());
        assert!(storage.get(HISTORY_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        storage.set(HISTORY_KEY, "{ definitely not an array").unwrap();

        let history = HistoryStore::load(storage);
        assert!(history.is_empty());
    }

    #[test]
    fn test_oversized_log_is_truncated_on_load() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(InMemoryStorage::new());
        let records: Vec<_> = (0..60).map(|i| record(&i.to_string())).collect();
        storage.set(HISTORY_KEY, &serde_json::to_string(&records).unwrap()).unwrap();

        let history = HistoryStore::load(storage);
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
        assert_eq!(history.records()[0].source_text, "0");
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let failing = Arc::new(FailingStorage::default());
        let mut history = HistoryStore::load(failing.clone());

        history.append(record("one"));
        history.append(record("two"));

        assert!(!history.is_durable());
        assert_eq!(history.len(), 2);
        // Only the first failing write is attempted
        assert_eq!(failing.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_after_failed_write_removes_persisted_log() {
        let storage = Arc::new(WriteLimitedStorage {
            inner: InMemoryStorage::new(),
            allowed_writes: 1,
            writes: AtomicUsize::new(0),
        });
        let mut history = HistoryStore::load(storage.clone());
        history.append(record("written"));
        history.append(record("memory only"));
        assert!(!history.is_durable());
        assert!(storage.get(HISTORY_KEY).unwrap().is_some());

        history.clear();

        assert!(history.is_empty());
        assert!(storage.get(HISTORY_KEY).unwrap().is_none());
        assert!(HistoryStore::load(storage).is_empty());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.redb");

        let id = {
            let mut history = HistoryStore::open(&path);
            history.append(record("persisted"));
            history.records()[0].id.clone()
        };

        let history = HistoryStore::open(&path);
        assert!(history.is_durable());
        assert_eq!(history.get(&id).unwrap().source_text, "persisted");
    }
}
