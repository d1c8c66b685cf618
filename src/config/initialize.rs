use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;

use crate::common::{debug, info, Result};
use crate::config::{filepath, Backend, Config};
use crate::content::Content;
use crate::core::SessionAuthority;
use crate::provider::LocalAuthProvider;
use crate::store::{BlobStore, FileBlobStore, FileStore, MemoryBlobStore, MemoryStore, SharedStore};

#[derive(Debug)]
pub struct Initializer {
    pub config: Config,
}

impl Initializer {
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub async fn load_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = fs::File::open(path).await?;
        let config = serde_yaml::from_reader::<_, Config>(f.into_std().await)?;

        Ok(Self { config })
    }

    pub fn set_root_dir(&mut self, root_dir: impl Into<PathBuf>) {
        self.config.storage.set_root_dir(&mut Some(root_dir.into()));
    }

    /// Create the directory layout of the file backend.
    pub async fn init_dir(&self) -> Result<()> {
        if self.config.storage.backend() != Backend::File {
            return Ok(());
        }
        let root = self.config.storage.root_dir();
        for dir in &[filepath::COLLECTIONS, filepath::BLOBS] {
            let dir = root.join(dir);
            debug!(path=%dir.display(), "Create directory");
            fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Wire backends, auth provider and session authority together.
    /// Must be called within a tokio runtime.
    pub async fn build(self) -> Result<Portal> {
        let Initializer { config } = self;

        let (store, blobs) = match config.storage.backend() {
            Backend::File => {
                let root = config.storage.root_dir();
                let store = FileStore::open(root.join(filepath::COLLECTIONS)).await?;
                let blobs = FileBlobStore::open(root.join(filepath::BLOBS)).await?;
                (
                    Arc::new(store) as SharedStore,
                    Arc::new(blobs) as Arc<dyn BlobStore>,
                )
            }
            Backend::Memory => (
                Arc::new(MemoryStore::new()) as SharedStore,
                Arc::new(MemoryBlobStore::new()) as Arc<dyn BlobStore>,
            ),
        };
        info!(backend=?config.storage.backend(), "Storage ready");

        let provider = Arc::new(LocalAuthProvider::new(
            store.clone(),
            config.auth.min_password_length(),
        ));
        let session = SessionAuthority::start(provider.clone(), store.clone(), config.auth.clone());
        let content = Content::new(store, blobs);

        Ok(Portal {
            session,
            content,
            provider,
        })
    }
}

/// Everything a front end needs: the admin session and the content collections.
#[derive(Clone)]
pub struct Portal {
    pub session: SessionAuthority,
    pub content: Content,
    provider: Arc<LocalAuthProvider>,
}

impl Portal {
    pub fn provider(&self) -> &LocalAuthProvider {
        &self.provider
    }
}
