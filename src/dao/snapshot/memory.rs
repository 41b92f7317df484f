//! In-process snapshot store, used by unit tests and ephemeral setups.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::dao::{snapshot::SnapshotStore, storage::StorageResult};

/// Snapshot store keeping the collection in process memory.
///
/// Nothing survives a restart; the value of this backend is that every
/// component test can run against real store semantics without touching disk.
#[derive(Default)]
pub struct MemoryStore<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T> MemoryStore<T> {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> MemoryStore<T> {
    /// Current contents, for test assertions.
    pub async fn snapshot(&self) -> Vec<T> {
        self.items.lock().await.clone()
    }
}

impl<T> SnapshotStore<T> for MemoryStore<T>
where
    T: Clone + Send + 'static,
{
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<T>>> {
        let items = Arc::clone(&self.items);
        Box::pin(async move { Ok(items.lock().await.clone()) })
    }

    fn save(&self, new_items: Vec<T>) -> BoxFuture<'static, StorageResult<()>> {
        let items = Arc::clone(&self.items);
        Box::pin(async move {
            *items.lock().await = new_items;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
