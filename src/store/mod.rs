//! Document and blob storage boundaries.
//!
//! The portal treats both as opaque external services: a document store made of
//! named collections of JSON objects keyed by id, and a blob store addressed by
//! slash separated paths.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value as JsonValue;

use crate::common::Result;

mod memory;
pub use self::memory::MemoryStore;

mod file;
pub use self::file::FileStore;

pub mod blob;
pub use self::blob::{BlobStore, FileBlobStore, MemoryBlobStore};

/// A stored document. Field names follow the camelCase convention of the site.
pub type Document = serde_json::Map<String, JsonValue>;

pub type DocumentId = String;

pub type SharedStore = Arc<dyn DocumentStore>;

// Length of generated document ids.
pub const GENERATED_ID_LENGTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    // Documents missing the field sort after the ones that have it.
    pub(crate) fn sort(&self, docs: &mut [(DocumentId, Document)]) {
        docs.sort_by(|(_, a), (_, b)| {
            let ord = match (a.get(&self.field), b.get(&self.field)) {
                (Some(a), Some(b)) => compare_values(a, b),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match self.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        })
    }
}

fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (JsonValue::String(a), JsonValue::String(b)) => a.cmp(b),
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Generate a random alphanumeric document id.
pub fn generate_id() -> DocumentId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Create or overwrite the document stored under id.
    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<()>;

    /// Store the document under a generated id and return it.
    async fn insert(&self, collection: &str, document: Document) -> Result<DocumentId>;

    /// Merge fields into an existing document. Fails with NotFound if absent.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()>;

    /// Remove the document. Removing a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    async fn list(
        &self,
        collection: &str,
        order_by: Option<&OrderBy>,
    ) -> Result<Vec<(DocumentId, Document)>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: JsonValue) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn order_by_desc_puts_missing_last() {
        let mut docs = vec![
            ("a".to_owned(), doc(json!({"createdAt": "2024-01-01T00:00:00Z"}))),
            ("b".to_owned(), doc(json!({}))),
            ("c".to_owned(), doc(json!({"createdAt": "2024-03-01T00:00:00Z"}))),
        ];
        OrderBy::desc("createdAt").sort(&mut docs);

        let ids: Vec<_> = docs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn generated_ids() {
        let id = generate_id();
        assert_eq!(id.len(), GENERATED_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_id());
    }
}
