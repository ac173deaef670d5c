use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Destination for uploaded files
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn put(&self, name: &str, data: Bytes) -> Result<(), StorageError>;
}

/// Writes files into a directory on local disk
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let plain = !name.is_empty()
            && !name.starts_with('.')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !plain {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn put(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, &data).await?;
        info!(path = %path.display(), bytes = data.len(), "stored upload");
        Ok(())
    }
}
