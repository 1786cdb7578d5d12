use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Blob-by-key persistence.
///
/// Values are opaque strings here; typed access goes through
/// [`crate::json`]. Each engine owns one key and is its only writer.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Simple in-memory store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .clear();
        Ok(())
    }
}

/// The store behind a trait object so backends can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "one".into()).await.unwrap();
        store.set("k", "two".into()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_drops_every_key() {
        let store = InMemoryStore::new();
        store.set("a", "1".into()).await.unwrap();
        store.set("b", "2".into()).await.unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set("shared", "v".into()).await.unwrap();
        assert_eq!(other.get("shared").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn storage_handle_wraps_in_memory_store() {
        let storage = Storage::in_memory();
        storage.kv.set("a", "1".into()).await.unwrap();
        assert_eq!(storage.kv.get("a").await.unwrap().as_deref(), Some("1"));
    }
}
