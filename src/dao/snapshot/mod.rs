pub mod json_file;
pub mod memory;

use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over whole-collection snapshot persistence.
///
/// Both durable collections of this backend (registrations and notification
/// attempts) are small enough to be loaded and rewritten as a unit; every
/// mutation goes through `load` + `save` under the owning component's write
/// gate. Swapping a snapshot store for an append-only log or an embedded
/// database does not change any component contract.
pub trait SnapshotStore<T>: Send + Sync {
    /// Load the full collection. A store that has never been written yields
    /// an empty collection, not an error.
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<T>>>;
    /// Replace the durable collection with `items`.
    fn save(&self, items: Vec<T>) -> BoxFuture<'static, StorageResult<()>>;
    /// Probe whether the backing medium is currently usable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
