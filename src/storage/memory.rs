// src/storage/memory.rs
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::errors::RidelineResult;
use crate::storage::{DocumentWrite, StoreBackend};

/// In-memory backend for tests and local development. `put_many` holds the
/// single write lock for the whole batch, which makes it atomic with respect
/// to every other operation.
#[derive(Default)]
pub struct MemoryBackend {
    store: RwLock<BTreeMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn get(&self, key: &str) -> RidelineResult<Option<String>> {
        let store = self.store.read().await;
        Ok(store.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> RidelineResult<()> {
        let mut store = self.store.write().await;
        store.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> RidelineResult<()> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> RidelineResult<Vec<String>> {
        let store = self.store.read().await;
        Ok(store
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn put_many(&self, writes: Vec<DocumentWrite>) -> RidelineResult<()> {
        let mut store = self.store.write().await;
        for write in writes {
            store.insert(write.key, write.value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let backend = MemoryBackend::new();
        backend.put("driver:a", "one".to_string()).await.unwrap();
        assert_eq!(backend.get("driver:a").await.unwrap(), Some("one".to_string()));

        backend.delete("driver:a").await.unwrap();
        assert_eq!(backend.get("driver:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scan_respects_prefix() {
        let backend = MemoryBackend::new();
        backend.put("driver:a", "1".to_string()).await.unwrap();
        backend.put("driver:b", "2".to_string()).await.unwrap();
        backend.put("vehicle:a", "3".to_string()).await.unwrap();

        let drivers = backend.scan("driver:").await.unwrap();
        assert_eq!(drivers, vec!["1".to_string(), "2".to_string()]);

        let vehicles = backend.scan("vehicle:").await.unwrap();
        assert_eq!(vehicles, vec!["3".to_string()]);
    }

    #[tokio::test]
    async fn test_put_many_writes_all() {
        let backend = MemoryBackend::new();
        backend
            .put_many(vec![
                DocumentWrite { key: "driver:a".to_string(), value: "1".to_string() },
                DocumentWrite { key: "vehicle:b".to_string(), value: "2".to_string() },
            ])
            .await
            .unwrap();

        assert_eq!(backend.get("driver:a").await.unwrap(), Some("1".to_string()));
        assert_eq!(backend.get("vehicle:b").await.unwrap(), Some("2".to_string()));
    }
}
