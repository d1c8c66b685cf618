use serde::{Deserialize, Serialize};

use crate::common::{debug, warn, ErrorKind, Result, Time};
use crate::core::Identity;
use crate::store::SharedStore;

/// Document whose existence under a user id grants admin rights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeRecord {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub role: String,
    pub created_at: Time,
}

impl PrivilegeRecord {
    pub const ROLE_ADMIN: &'static str = "admin";

    pub fn admin(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            role: PrivilegeRecord::ROLE_ADMIN.to_owned(),
            created_at: chrono::Utc::now(),
        }
    }
}

/// Outcome of a privilege lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Privilege {
    Granted,
    Denied,
    // Lookup failed. Treated as denied, but kept apart so callers can tell.
    Undetermined(String),
}

impl Privilege {
    pub fn is_granted(&self) -> bool {
        matches!(self, Privilege::Granted)
    }
}

/// Point lookups and writes against the privilege collection.
#[derive(Clone)]
pub(crate) struct PrivilegeResolver {
    store: SharedStore,
    collection: String,
}

impl PrivilegeResolver {
    pub(crate) fn new(store: SharedStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    // No caching, no retry. Store failures fail closed.
    pub(crate) async fn resolve(&self, identity: &Identity) -> Privilege {
        match self.store.get(&self.collection, &identity.id).await {
            Ok(Some(_)) => Privilege::Granted,
            Ok(None) => Privilege::Denied,
            Err(err) => {
                warn!(user=%identity, "Privilege lookup failed {}", err);
                Privilege::Undetermined(err.message())
            }
        }
    }

    pub(crate) async fn grant(
        &self,
        identity: &Identity,
        display_name: &str,
    ) -> Result<PrivilegeRecord> {
        let record = PrivilegeRecord::admin(identity.email.clone(), display_name);
        let document = match serde_json::to_value(&record)? {
            serde_json::Value::Object(document) => document,
            _ => return Err(ErrorKind::Internal("privilege record is not an object".into()).into()),
        };

        self.store
            .set(&self.collection, &identity.id, document)
            .await?;
        debug!(user=%identity, "Privilege record written");

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{DocumentStore, MemoryStore};

    #[test]
    fn resolve_by_record_existence() {
        tokio_test::block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let resolver = PrivilegeResolver::new(store.clone(), "admins");
            let ann = Identity::new("uid-ann", "a@x.com");

            assert_eq!(resolver.resolve(&ann).await, Privilege::Denied);

            let record = resolver.grant(&ann, "Ann").await.unwrap();
            assert_eq!(record.role, "admin");
            assert_eq!(resolver.resolve(&ann).await, Privilege::Granted);

            let stored = store.get("admins", "uid-ann").await.unwrap().unwrap();
            assert_eq!(stored["email"], "a@x.com");
            assert_eq!(stored["displayName"], "Ann");
            assert!(stored.contains_key("createdAt"));
        });
    }
}
