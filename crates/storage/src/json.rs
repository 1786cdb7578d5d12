//! Typed access to stored JSON values.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::{KeyValueStore, StorageError};

/// Read and decode the value under `key`.
///
/// A value that no longer decodes is logged and reported as absent so the
/// caller falls back to a fresh default.
///
/// # Errors
///
/// Returns `StorageError` only when the backend itself fails.
pub async fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding corrupt stored value");
            Ok(None)
        }
    }
}

/// Encode `value` and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails, or a backend error.
pub async fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.set(key, raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        item_count: u32,
    }

    #[tokio::test]
    async fn writes_camel_case_and_reads_back() {
        let store = InMemoryStore::new();
        write_json(&store, "sample", &Sample { item_count: 3 }).await.unwrap();

        assert_eq!(
            store.get("sample").await.unwrap().as_deref(),
            Some(r#"{"itemCount":3}"#)
        );
        let read: Option<Sample> = read_json(&store, "sample").await.unwrap();
        assert_eq!(read, Some(Sample { item_count: 3 }));
    }

    #[tokio::test]
    async fn corrupt_value_reads_as_absent() {
        let store = InMemoryStore::new();
        store.set("sample", "{broken".into()).await.unwrap();
        let read: Option<Sample> = read_json(&store, "sample").await.unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn missing_value_reads_as_absent() {
        let store = InMemoryStore::new();
        let read: Option<Sample> = read_json(&store, "nothing").await.unwrap();
        assert!(read.is_none());
    }
}
