use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Generic JSON file-backed document store.
///
/// Holds exactly one document of type `T` on disk. Nothing is cached between
/// calls: `load` reads the file every time and `save` replaces it whole by
/// writing a sibling temp file and renaming it over the target, so a reader
/// sees either the previous or the next complete document.
pub struct JsonDocumentStore<T> {
    file_path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Open the store at `path`, creating the directory and an empty document if missing.
    /// Temp files left by interrupted saves are removed, and an existing document is
    /// parsed once so corruption is reported at startup.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let store = Self { file_path: path.into(), _doc: PhantomData };
        store.ensure_parent().await?;
        store.sweep_stale_temps().await;
        store.load().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and deserialize the document, initializing it first if it does not exist.
    pub async fn load(&self) -> Result<T, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.ensure_parent().await?;
                self.initialize().await?;
                fs::read(&self.file_path)
                    .await
                    .map_err(|e| ServiceError::corrupt(&self.file_path, e))?
            }
            Err(e) => return Err(ServiceError::corrupt(&self.file_path, e)),
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %self.file_path.display(), error = %e, "backing document cannot be parsed");
            ServiceError::corrupt(&self.file_path, e)
        })
    }

    /// Serialize `doc` and atomically replace the backing document.
    pub async fn save(&self, doc: &T) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc)
            .map_err(|e| ServiceError::persistence(&self.file_path, e))?;
        let tmp = self.write_temp(&data).await?;

        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::persistence(&self.file_path, e));
        }
        self.sync_parent().await;
        debug!(path = %self.file_path.display(), bytes = data.len(), "document saved");
        Ok(())
    }

    /// Write the default document without clobbering one that appeared meanwhile.
    async fn initialize(&self) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(&T::default())
            .map_err(|e| ServiceError::persistence(&self.file_path, e))?;
        let tmp = self.write_temp(&data).await?;

        // hard_link fails with AlreadyExists instead of replacing the target
        let result = match fs::hard_link(&tmp, &self.file_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => {
                debug!(error = %e, "hard link unavailable, falling back to rename");
                match fs::metadata(&self.file_path).await {
                    Ok(_) => Ok(false),
                    Err(_) => fs::rename(&tmp, &self.file_path).await.map(|_| true),
                }
            }
        };
        let _ = fs::remove_file(&tmp).await;

        match result {
            Ok(true) => {
                self.sync_parent().await;
                info!(path = %self.file_path.display(), "initialized empty document");
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => Err(ServiceError::persistence(&self.file_path, e)),
        }
    }

    async fn write_temp(&self, data: &[u8]) -> Result<PathBuf, ServiceError> {
        let tmp = self.temp_path();
        if let Err(e) = write_synced(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::persistence(&tmp, e));
        }
        Ok(tmp)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");
        self.file_path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    /// Best-effort removal of `.{name}.*.tmp` siblings; the target itself is never touched.
    async fn sweep_stale_temps(&self) {
        let Some(name) = self.file_path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        let dir = match self.file_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let Ok(mut entries) = fs::read_dir(dir).await else {
            return;
        };

        let prefix = format!(".{}.", name);
        let mut removed = 0usize;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let entry_name = entry.file_name();
            let Some(entry_name) = entry_name.to_str() else {
                continue;
            };
            if entry_name.starts_with(&prefix)
                && entry_name.ends_with(".tmp")
                && fs::remove_file(entry.path()).await.is_ok()
            {
                removed += 1;
            }
        }
        if removed > 0 {
            warn!(path = %self.file_path.display(), removed, "removed temp files left by interrupted saves");
        }
    }

    async fn ensure_parent(&self) -> Result<(), ServiceError> {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::persistence(parent, e)),
            _ => Ok(()),
        }
    }

    /// Flush the directory entry so the rename itself survives a crash.
    #[cfg(unix)]
    async fn sync_parent(&self) {
        let parent = match self.file_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Ok(dir) = fs::File::open(parent).await {
            let _ = dir.sync_all().await;
        }
    }

    #[cfg(not(unix))]
    async fn sync_parent(&self) {}
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}
