//! In-memory key-value store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use super::error::StorageError;
use super::store::KeyValueStore;

/// Volatile key-value store backed by a `BTreeMap`.
///
/// Reads and writes can be made to fail on demand, which lets callers
/// exercise their storage error paths.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `set`/`remove` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "in-memory store rejected {op}"
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::check(&self.fail_reads, "read")?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::check(&self.fail_writes, "write")?;
        self.entries
            .lock()
            .await
            .insert(String::from(key), String::from(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::check(&self.fail_writes, "remove")?;
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StorageError> {
        Self::check(&self.fail_writes, "write")?;
        let mut entries = self.entries.lock().await;
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(String::from(key), String::from(new));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        // Arrange
        let store = MemoryStore::new();

        // Act
        store.set("userProfile", "{}").await.unwrap();
        let before = store.get("userProfile").await.unwrap();
        store.remove("userProfile").await.unwrap();
        let after = store.get("userProfile").await.unwrap();

        // Assert
        assert_eq!(before.as_deref(), Some("{}"));
        assert!(after.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop() {
        // Arrange
        let store = MemoryStore::new();

        // Act
        let result = store.remove("missing").await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        // Arrange
        let store = MemoryStore::new();
        store.fail_writes(true);

        // Act
        let result = store.set("k", "v").await;

        // Assert
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_compare_and_swap_checks_current_value() {
        // Arrange
        let store = MemoryStore::new();
        store.set("k", "old").await.unwrap();

        // Act
        let stale = store.compare_and_swap("k", None, "x").await.unwrap();
        let fresh = store.compare_and_swap("k", Some("old"), "new").await.unwrap();

        // Assert
        assert!(!stale);
        assert!(fresh);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
