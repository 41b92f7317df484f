//! JSON-file snapshot store: one pretty-printed array per collection,
//! rewritten atomically on every save.

use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, io::AsyncWriteExt};

use crate::dao::{
    snapshot::SnapshotStore,
    storage::{StorageError, StorageResult},
};

/// Snapshot store persisting a collection as a single JSON file on disk.
///
/// Saves go through a sibling temp file, an fsync, and a rename, so a crash
/// mid-write leaves either the previous snapshot or the new one, never a
/// torn file. A missing file reads as an empty collection (first boot);
/// undecodable content is reported as corruption instead of being treated as
/// an empty store.
pub struct JsonFileStore<T> {
    path: Arc<PathBuf>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Create a store backed by the given file path. The parent directory
    /// must exist before the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            _entity: PhantomData,
        }
    }

    /// Path of the backing snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> SnapshotStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn load(&self) -> BoxFuture<'static, StorageResult<Vec<T>>> {
        let path = Arc::clone(&self.path);
        Box::pin(async move { read_snapshot(&path).await })
    }

    fn save(&self, items: Vec<T>) -> BoxFuture<'static, StorageResult<()>> {
        let path = Arc::clone(&self.path);
        Box::pin(async move { write_snapshot(&path, &items).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let path = Arc::clone(&self.path);
        Box::pin(async move { read_snapshot::<T>(&path).await.map(|_| ()) })
    }
}

async fn read_snapshot<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(StorageError::unavailable(
                format!("reading snapshot `{}`", path.display()),
                err,
            ));
        }
    };

    serde_json::from_slice(&bytes).map_err(|err| {
        StorageError::corrupted(format!("decoding snapshot `{}`", path.display()), err)
    })
}

async fn write_snapshot<T: Serialize>(path: &Path, items: &[T]) -> StorageResult<()> {
    let payload = serde_json::to_vec_pretty(items).map_err(|err| {
        StorageError::unavailable(format!("encoding snapshot `{}`", path.display()), err)
    })?;

    let tmp = temp_path(path);
    let io_error = |stage: &str, err: std::io::Error| {
        StorageError::unavailable(format!("{stage} `{}`", tmp.display()), err)
    };

    let mut file = fs::File::create(&tmp)
        .await
        .map_err(|err| io_error("creating temp snapshot", err))?;
    file.write_all(&payload)
        .await
        .map_err(|err| io_error("writing temp snapshot", err))?;
    file.sync_all()
        .await
        .map_err(|err| io_error("syncing temp snapshot", err))?;
    drop(file);

    fs::rename(&tmp, path).await.map_err(|err| {
        StorageError::unavailable(
            format!("renaming snapshot `{}` into place", path.display()),
            err,
        )
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("snapshot");
    path.with_file_name(format!("{name}.tmp"))
}
