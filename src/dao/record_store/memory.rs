//! In-process record store used for local development and tests.

use std::{
    collections::HashMap,
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::dao::{
    record_store::{AccountKeying, Record, RecordPath, RecordStore},
    storage::{StorageError, StorageResult},
};

/// Record store keeping every collection in memory, in insertion order.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    collections: RwLock<HashMap<&'static str, IndexMap<String, Record>>>,
    keying: AccountKeying,
    offline: AtomicBool,
    mutations: AtomicU64,
}

impl MemoryRecordStore {
    /// Empty store keying accounts by their raw identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store using the given account keying scheme.
    pub fn with_keying(keying: AccountKeying) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                keying,
                ..MemoryInner::default()
            }),
        }
    }

    /// Simulate the backend going away (`true`) or coming back (`false`).
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of write and delete calls that reached the store.
    pub fn mutation_count(&self) -> u64 {
        self.inner.mutations.load(Ordering::SeqCst)
    }
}

impl MemoryInner {
    fn ensure_online(&self, operation: &str) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                format!("memory store offline during {operation}"),
                io::Error::new(io::ErrorKind::NotConnected, "store offline"),
            ));
        }
        Ok(())
    }
}

impl RecordStore for MemoryRecordStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn account_keying(&self) -> AccountKeying {
        self.inner.keying
    }

    fn write(&self, path: RecordPath, record: Record) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online("write")?;
            inner.mutations.fetch_add(1, Ordering::SeqCst);
            let mut guard = inner.collections.write().await;
            guard
                .entry(path.collection)
                .or_default()
                .insert(path.key, record);
            Ok(())
        })
    }

    fn read(&self, path: RecordPath) -> BoxFuture<'static, StorageResult<Option<Record>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online("read")?;
            let guard = inner.collections.read().await;
            Ok(guard
                .get(path.collection)
                .and_then(|children| children.get(&path.key))
                .cloned())
        })
    }

    fn delete(&self, path: RecordPath) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online("delete")?;
            inner.mutations.fetch_add(1, Ordering::SeqCst);
            let mut guard = inner.collections.write().await;
            if let Some(children) = guard.get_mut(path.collection) {
                children.shift_remove(&path.key);
            }
            Ok(())
        })
    }

    fn list_children(
        &self,
        collection: &'static str,
    ) -> BoxFuture<'static, StorageResult<IndexMap<String, Record>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ensure_online("list")?;
            let guard = inner.collections.read().await;
            Ok(guard.get(collection).cloned().unwrap_or_default())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.ensure_online("health check") })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.ensure_online("reconnect") })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(name: &str) -> Record {
        let mut record = Record::new();
        record.insert("name".into(), json!(name));
        record
    }

    #[tokio::test]
    async fn write_read_delete_cycle() {
        let store = MemoryRecordStore::new();
        let path = RecordPath::new("matches", "T1");

        assert_eq!(store.read(path.clone()).await.unwrap(), None);
        store.write(path.clone(), record("a")).await.unwrap();
        assert_eq!(store.read(path.clone()).await.unwrap(), Some(record("a")));

        store.delete(path.clone()).await.unwrap();
        store.delete(path.clone()).await.unwrap();
        assert_eq!(store.read(path).await.unwrap(), None);
        assert_eq!(store.mutation_count(), 3);
    }

    #[tokio::test]
    async fn listing_keeps_insertion_order_and_overwrites_in_place() {
        let store = MemoryRecordStore::new();
        for key in ["b", "a", "c"] {
            store
                .write(RecordPath::new("matches", key), record(key))
                .await
                .unwrap();
        }
        store
            .write(RecordPath::new("matches", "a"), record("again"))
            .await
            .unwrap();

        let children = store.list_children("matches").await.unwrap();
        assert_eq!(children.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(children["a"], record("again"));
        assert!(store.list_children("users").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryRecordStore::new();
        store.set_offline(true);

        assert!(store.list_children("matches").await.is_err());
        assert!(store.health_check().await.is_err());
        assert!(
            store
                .write(RecordPath::new("matches", "T1"), record("a"))
                .await
                .is_err()
        );

        store.set_offline(false);
        assert!(store.try_reconnect().await.is_ok());
    }
}
