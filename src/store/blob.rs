use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tokio::fs;

use crate::common::{debug, ErrorKind, Result};

/// Blob storage used for uploaded images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Bytes) -> Result<()>;

    /// Url under which the blob stored at path can be downloaded.
    async fn download_url(&self, path: &str) -> Result<String>;
}

// Blob paths are relative and must not escape the store root.
fn validate_path(path: &str) -> Result<&Path> {
    let p = Path::new(path);
    let valid = !path.is_empty() && p.components().all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(p)
    } else {
        Err(ErrorKind::Store(format!("invalid blob path {:?}", path)).into())
    }
}

fn not_found(path: &str) -> crate::Error {
    ErrorKind::NotFound {
        collection: "blobs".to_owned(),
        id: path.to_owned(),
    }
    .into()
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub const URL_SCHEME: &'static str = "memory://";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.blobs.read().get(path).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Bytes) -> Result<()> {
        validate_path(path)?;
        self.blobs.write().insert(path.to_owned(), bytes);
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        if self.blobs.read().contains_key(path) {
            Ok(format!("{}{}", MemoryBlobStore::URL_SCHEME, path))
        } else {
            Err(not_found(path))
        }
    }
}

/// Blob store writing each blob to a file below a root directory.
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        // Urls are absolute file urls.
        let root = root.canonicalize()?;
        debug!("Open blob store {}", root.display());

        Ok(Self { root })
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn upload(&self, path: &str, bytes: Bytes) -> Result<()> {
        let target = self.root.join(validate_path(path)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &bytes).await?;
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let target = self.root.join(validate_path(path)?);
        if fs::metadata(&target).await.is_err() {
            return Err(not_found(path));
        }
        Ok(format!("file://{}", target.display()))
    }
}
