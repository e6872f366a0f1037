//! File-backed document store
//!
//! Each named resource is one pretty-printed JSON document under the data
//! directory. Writes go to a temporary file beside the target and are renamed
//! into place, so readers only ever observe a complete document. Every
//! resource name owns its own async mutex; `with_lock` is the only
//! read-modify-write path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::error::StorageError;

/// Handle to the document store. Cheap to clone; clones share locks.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    data_dir: PathBuf,
    seed_dir: Option<PathBuf>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DocumentStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        seed_dir: Option<PathBuf>,
    ) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| StorageError::io(data_dir.display().to_string(), e))?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                data_dir,
                seed_dir,
                locks: DashMap::new(),
            }),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    /// Read and decode the named resource.
    ///
    /// A missing resource yields the seed document if one exists, otherwise
    /// `D::default()`.
    #[instrument(skip(self), fields(resource = %name))]
    pub async fn load<D>(&self, name: &str) -> Result<D, StorageError>
    where
        D: DeserializeOwned + Default,
    {
        self.inner.load(name).await
    }

    /// Encode and atomically replace the named resource.
    #[instrument(skip(self, document), fields(resource = %name))]
    pub async fn save<D>(&self, name: &str, document: &D) -> Result<(), StorageError>
    where
        D: Serialize,
    {
        self.inner.save(name, document).await
    }

    /// Run `f` against the current document while holding the resource's lock.
    ///
    /// If `f` succeeds the mutated document is persisted before the lock is
    /// released and its output returned. If `f` fails nothing is written.
    /// The lock is taken in the caller's future, so a caller dropped while
    /// waiting applies nothing; once taken, load-mutate-save runs to
    /// completion on its own task.
    #[instrument(skip(self, f), fields(resource = %name))]
    pub async fn with_lock<D, R, E, F>(&self, name: &str, f: F) -> Result<R, E>
    where
        D: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
        R: Send + 'static,
        E: From<StorageError> + Send + 'static,
        F: FnOnce(&mut D) -> Result<R, E> + Send + 'static,
    {
        let lock = self.lock_for(name);
        let guard = lock.lock_owned().await;
        debug!("acquired resource lock");

        let inner = Arc::clone(&self.inner);
        let resource = name.to_string();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let mut document: D = inner.load(&resource).await?;
            let output = f(&mut document)?;
            inner.save(&resource, &document).await?;
            Ok::<R, E>(output)
        });

        match task.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                error!("mutation panicked; document left unchanged");
                Err(E::from(StorageError::interrupted(name, "mutation panicked")))
            }
            Err(join_error) => {
                error!(%join_error, "mutation task aborted");
                Err(E::from(StorageError::interrupted(name, join_error.to_string())))
            }
        }
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        self.inner
            .locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl StoreInner {
    fn path_for(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.json", name))
    }

    async fn load<D>(&self, name: &str) -> Result<D, StorageError>
    where
        D: DeserializeOwned + Default,
    {
        let path = self.path_for(&self.data_dir, name);
        match read_optional(&path, name).await? {
            Some(bytes) => decode(name, &bytes),
            None => match &self.seed_dir {
                Some(seed_dir) => {
                    let seed = self.path_for(seed_dir, name);
                    match read_optional(&seed, name).await? {
                        Some(bytes) => {
                            debug!(seed = %seed.display(), "loading seed document");
                            decode(name, &bytes)
                        }
                        None => Ok(D::default()),
                    }
                }
                None => Ok(D::default()),
            },
        }
    }

    async fn save<D>(&self, name: &str, document: &D) -> Result<(), StorageError>
    where
        D: Serialize,
    {
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|e| StorageError::corrupt(name, e))?;

        let target = self.path_for(&self.data_dir, name);
        let tmp = self
            .data_dir
            .join(format!(".{}.json.{}.tmp", name, Uuid::new_v4().simple()));

        if let Err(e) = write_synced(&tmp, &bytes).await {
            discard(&tmp).await;
            return Err(StorageError::io(name, e));
        }
        if let Err(e) = fs::rename(&tmp, &target).await {
            discard(&tmp).await;
            return Err(StorageError::io(name, e));
        }

        debug!(bytes = bytes.len(), "document persisted");
        Ok(())
    }
}

async fn read_optional(path: &Path, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::io(name, e)),
    }
}

fn decode<D: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<D, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::corrupt(name, e))
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove temporary file");
        }
    }
}
