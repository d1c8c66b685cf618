//! Typed content collections behind the management screens and public forms.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::common::{debug, info, ErrorKind, Result, Time};
use crate::core::Admission;
use crate::store::{BlobStore, Document, DocumentId, OrderBy, SharedStore};

mod model;
pub use self::model::{
    Consultation, ContactMessage, Project, QuoteRequest, Service, ServiceCategory, TeamMember,
    Testimonial,
};

mod images;
pub use self::images::ImageUploader;

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// A kind of document stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    // Whether public pages may read the collection without an admission.
    const PUBLIC_READ: bool;

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    // Fill derived fields before a write.
    fn prepare(&mut self) {}
}

/// Entities that visitors may create without signing in.
pub trait Submission: Entity {}

/// A stored entity with its id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: DocumentId,
    pub created_at: Option<Time>,
    pub updated_at: Option<Time>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Entity> Record<T> {
    fn from_document(id: DocumentId, mut doc: Document) -> Result<Self> {
        let created_at = take_time(&mut doc, CREATED_AT)?;
        let updated_at = take_time(&mut doc, UPDATED_AT)?;
        let data = serde_json::from_value(serde_json::Value::Object(doc))?;

        Ok(Self {
            id,
            created_at,
            updated_at,
            data,
        })
    }
}

fn take_time(doc: &mut Document, field: &str) -> Result<Option<Time>> {
    match doc.remove(field) {
        Some(serde_json::Value::Null) | None => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(doc) => Ok(doc),
        _ => Err(ErrorKind::Internal("entity is not an object".into()).into()),
    }
}

// Fixed width timestamps so that string order is time order.
fn stamp(doc: &mut Document, field: &str) {
    let now = chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    doc.insert(field.to_owned(), serde_json::Value::String(now));
}

/// Typed access to one collection.
pub struct Collection<T> {
    store: SharedStore,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T>
where
    T: Entity,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Collection({})", T::COLLECTION)
    }
}

impl<T: Entity> Collection<T> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn check_read(&self, viewer: Option<&Admission>) -> Result<()> {
        if T::PUBLIC_READ {
            return Ok(());
        }
        match viewer {
            Some(admission) => admission.check().map(|_| ()),
            None => Err(
                ErrorKind::Unauthorized(format!("{} requires admin access", T::COLLECTION)).into(),
            ),
        }
    }

    /// Newest first.
    pub async fn list(&self, viewer: Option<&Admission>) -> Result<Vec<Record<T>>> {
        self.check_read(viewer)?;

        self.store
            .list(T::COLLECTION, Some(&OrderBy::desc(CREATED_AT)))
            .await?
            .into_iter()
            .map(|(id, doc)| Record::from_document(id, doc))
            .collect()
    }

    pub async fn get(&self, id: &str, viewer: Option<&Admission>) -> Result<Record<T>> {
        self.check_read(viewer)?;

        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Record::from_document(id.to_owned(), doc),
            None => Err(ErrorKind::NotFound {
                collection: T::COLLECTION.to_owned(),
                id: id.to_owned(),
            }
            .into()),
        }
    }

    pub async fn add(&self, admission: &Admission, data: T) -> Result<DocumentId> {
        let user = admission.check()?;
        let id = self.insert(data).await?;
        info!(%user, collection=T::COLLECTION, %id, "Added");
        Ok(id)
    }

    /// Replace the entity fields, keeping its creation time.
    pub async fn update(&self, admission: &Admission, id: &str, mut data: T) -> Result<()> {
        let user = admission.check()?;
        data.prepare();
        data.validate()?;

        let mut doc = to_document(&data)?;
        stamp(&mut doc, UPDATED_AT);
        self.store.update(T::COLLECTION, id, doc).await?;
        info!(%user, collection=T::COLLECTION, %id, "Updated");

        Ok(())
    }

    pub async fn delete(&self, admission: &Admission, id: &str) -> Result<()> {
        let user = admission.check()?;
        self.store.delete(T::COLLECTION, id).await?;
        info!(%user, collection=T::COLLECTION, %id, "Deleted");
        Ok(())
    }

    async fn insert(&self, mut data: T) -> Result<DocumentId> {
        data.prepare();
        data.validate()?;

        let mut doc = to_document(&data)?;
        stamp(&mut doc, CREATED_AT);
        self.store.insert(T::COLLECTION, doc).await
    }
}

impl<T: Submission> Collection<T> {
    /// Store a visitor submission. No session required.
    pub async fn submit(&self, data: T) -> Result<DocumentId> {
        let id = self.insert(data).await?;
        debug!(collection=T::COLLECTION, %id, "Submission stored");
        Ok(id)
    }
}

/// Entry point to every collection and the image uploader.
#[derive(Clone)]
pub struct Content {
    store: SharedStore,
    blobs: Arc<dyn BlobStore>,
}

impl Content {
    pub fn new(store: SharedStore, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    pub fn collection<T: Entity>(&self) -> Collection<T> {
        Collection::new(self.store.clone())
    }

    pub fn projects(&self) -> Collection<Project> {
        self.collection()
    }

    pub fn team(&self) -> Collection<TeamMember> {
        self.collection()
    }

    pub fn services(&self) -> Collection<Service> {
        self.collection()
    }

    pub fn testimonials(&self) -> Collection<Testimonial> {
        self.collection()
    }

    pub fn consultations(&self) -> Collection<Consultation> {
        self.collection()
    }

    pub fn quotes(&self) -> Collection<QuoteRequest> {
        self.collection()
    }

    pub fn messages(&self) -> Collection<ContactMessage> {
        self.collection()
    }

    pub fn images(&self) -> ImageUploader {
        ImageUploader::new(self.blobs.clone())
    }
}
