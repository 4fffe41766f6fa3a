//! Whole-file JSON persistence in the per-user application data folder.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storylib_core::{CoreError, ProfileDirs, SystemProfile};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::task;

pub mod listener;

pub use listener::{save_channel, spawn_save_listener, SaveJson};

#[derive(Debug, Error)]
pub enum JsonError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("invalid json in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot serialize {filename}: {source}")]
    Serialize {
        filename: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and writes `<app data>/<filename>`. The folder is looked up on every
/// call.
#[derive(Clone)]
pub struct JsonFile {
    profile: Arc<dyn ProfileDirs>,
}

impl Default for JsonFile {
    fn default() -> Self {
        Self::new(Arc::new(SystemProfile))
    }
}

impl JsonFile {
    pub fn new(profile: Arc<dyn ProfileDirs>) -> Self {
        Self { profile }
    }

    pub fn path_for(&self, filename: &str) -> Result<PathBuf, JsonError> {
        Ok(self.profile.app_data_dir()?.join(filename))
    }

    /// Fails if the file is missing or is not valid JSON for `T`.
    pub async fn load<T>(&self, filename: &str) -> Result<T, JsonError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = self.path_for(filename)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| CoreError::io(&path, e))?;
        serde_json::from_slice(&data).map_err(|source| JsonError::Parse { path, source })
    }

    /// Replaces the whole file with `data`, creating the folder if needed.
    pub async fn save<T>(&self, filename: &str, data: &T) -> Result<(), JsonError>
    where
        T: Serialize + ?Sized,
    {
        let path = self.path_for(filename)?;
        let bytes = serde_json::to_vec(data).map_err(|source| JsonError::Serialize {
            filename: filename.to_string(),
            source,
        })?;
        let target = path.clone();
        task::spawn_blocking(move || write_atomic(&target, &bytes))
            .await
            .map_err(CoreError::from)??;
        tracing::debug!(path = %path.display(), "saved json");
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| CoreError::io(parent, e))?;
    tmp.write_all(bytes).map_err(|e| CoreError::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| CoreError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| CoreError::io(path, e.error))?;
    Ok(())
}
