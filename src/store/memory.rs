use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::common::{trace, ErrorKind, Result};
use crate::store::{generate_id, Document, DocumentId, DocumentStore, OrderBy};

type Collection = BTreeMap<DocumentId, Document>;

/// Process local document store. Contents are lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in the collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        trace!(%collection, %id, "Set document");
        self.collections
            .write()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), document);
        Ok(())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<DocumentId> {
        let id = generate_id();
        self.set(collection, &id, document).await?;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        let mut collections = self.collections.write();
        let document = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| ErrorKind::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })?;
        document.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        if let Some(c) = self.collections.write().get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }

    async fn list(
        &self,
        collection: &str,
        order_by: Option<&OrderBy>,
    ) -> Result<Vec<(DocumentId, Document)>> {
        let mut docs: Vec<_> = self
            .collections
            .read()
            .get(collection)
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        if let Some(order_by) = order_by {
            order_by.sort(&mut docs);
        }
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn crud() {
        tokio_test::block_on(async move {
            let store = MemoryStore::new();

            let id = store
                .insert("team", doc(json!({"name": "Ann", "role": "Lead"})))
                .await
                .unwrap();
            assert_eq!(store.len("team"), 1);

            store
                .update("team", &id, doc(json!({"role": "Manager"})))
                .await
                .unwrap();
            let got = store.get("team", &id).await.unwrap().unwrap();
            assert_eq!(got["name"], "Ann");
            assert_eq!(got["role"], "Manager");

            store.delete("team", &id).await.unwrap();
            assert!(store.get("team", &id).await.unwrap().is_none());
            assert!(store.is_empty("team"));
        });
    }

    #[test]
    fn update_missing_document() {
        tokio_test::block_on(async move {
            let store = MemoryStore::new();
            let err = store
                .update("team", "nope", Document::new())
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        });
    }
}
