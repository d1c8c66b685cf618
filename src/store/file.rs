use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::common::{debug, Error, ErrorKind, Result};
use crate::store::{generate_id, Document, DocumentId, DocumentStore, OrderBy};

type Collection = BTreeMap<DocumentId, Document>;

/// Document store keeping each collection as a json file under a directory.
///
/// Every write rewrites the whole collection file through a temporary file and
/// a rename, so a crash never leaves a half written collection behind.
pub struct FileStore {
    dir: PathBuf,
    // Serialize read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileStore {
    pub const FILE_EXTENSION: &'static str = "json";

    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        debug!("Open file store {}", dir.display());

        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ErrorKind::Store(format!("invalid collection name {:?}", collection)).into());
        }
        Ok(self
            .dir
            .join(collection)
            .with_extension(FileStore::FILE_EXTENSION))
    }

    async fn load(&self, collection: &str) -> Result<Collection> {
        let path = self.collection_path(collection)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Collection::new()),
            Err(err) => Err(Error::from(err)),
        }
    }

    async fn save(&self, collection: &str, docs: &Collection) -> Result<()> {
        let path = self.collection_path(collection)?;
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, serde_json::to_vec_pretty(docs)?).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let mut docs = self.load(collection).await?;
        Ok(docs.remove(id))
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut docs = self.load(collection).await?;
        docs.insert(id.to_owned(), document);
        self.save(collection, &docs).await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<DocumentId> {
        let id = generate_id();
        self.set(collection, &id, document).await?;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut docs = self.load(collection).await?;
        let document = docs.get_mut(id).ok_or_else(|| ErrorKind::NotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        })?;
        document.extend(fields);
        self.save(collection, &docs).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut docs = self.load(collection).await?;
        if docs.remove(id).is_some() {
            self.save(collection, &docs).await?;
        }
        Ok(())
    }

    async fn list(
        &self,
        collection: &str,
        order_by: Option<&OrderBy>,
    ) -> Result<Vec<(DocumentId, Document)>> {
        let mut docs: Vec<_> = self.load(collection).await?.into_iter().collect();
        if let Some(order_by) = order_by {
            order_by.sort(&mut docs);
        }
        Ok(docs)
    }
}
