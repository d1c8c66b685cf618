#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch, Notify};

use cleanportal::core::{Config, Identity, SessionAuthority};
use cleanportal::provider::{AuthProvider, AuthStateReceiver, AuthStateSender, LocalAuthProvider};
use cleanportal::store::{Document, DocumentId, DocumentStore, MemoryStore, OrderBy, SharedStore};
use cleanportal::{ErrorKind, Result};

pub fn temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Memory store whose point lookups and writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_get: AtomicBool,
    fail_set: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Make writes to the collection fail, or stop failing with `None`.
    pub fn fail_set(&self, collection: Option<&str>) {
        *self.fail_set.lock() = collection.map(str::to_owned);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(ErrorKind::Store("connection reset".into()).into());
        }
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        if self.fail_set.lock().as_deref() == Some(collection) {
            return Err(ErrorKind::Store("deadline exceeded".into()).into());
        }
        self.inner.set(collection, id, document).await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<DocumentId> {
        self.inner.insert(collection, document).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.inner.delete(collection, id).await
    }

    async fn list(
        &self,
        collection: &str,
        order_by: Option<&OrderBy>,
    ) -> Result<Vec<(DocumentId, Document)>> {
        self.inner.list(collection, order_by).await
    }
}

/// Local provider counting sign outs, optionally failing them.
pub struct CountingProvider {
    inner: LocalAuthProvider,
    sign_outs: AtomicUsize,
    fail_sign_out: AtomicBool,
}

impl CountingProvider {
    pub fn new(store: SharedStore) -> Self {
        Self {
            inner: LocalAuthProvider::new(store, 6),
            sign_outs: AtomicUsize::new(0),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthProvider for CountingProvider {
    fn auth_state_changes(&self) -> AuthStateReceiver {
        self.inner.auth_state_changes()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        self.inner.sign_in(email, password).await
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<Identity> {
        self.inner.create_user(email, password).await
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ErrorKind::Provider("network request failed".into()).into());
        }
        self.inner.sign_out().await
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        self.inner.send_password_reset(email).await
    }
}

pub struct Fixture {
    pub store: Arc<FlakyStore>,
    pub provider: Arc<CountingProvider>,
    pub session: SessionAuthority,
}

/// Session over a fresh store. Must be called within a runtime.
pub fn fixture(config: Config) -> Fixture {
    let store = Arc::new(FlakyStore::default());
    let provider = Arc::new(CountingProvider::new(store.clone()));
    let session = SessionAuthority::start(provider.clone(), store.clone(), config);

    Fixture {
        store,
        provider,
        session,
    }
}

/// Memory store whose point lookups wait while held.
pub struct GatedStore {
    inner: MemoryStore,
    held: watch::Sender<bool>,
    entered: Notify,
}

impl Default for GatedStore {
    fn default() -> Self {
        Self {
            inner: MemoryStore::new(),
            held: watch::channel(false).0,
            entered: Notify::new(),
        }
    }
}

impl GatedStore {
    pub fn hold(&self) {
        self.held.send_replace(true);
    }

    pub fn release(&self) {
        self.held.send_replace(false);
    }

    /// Resolves once a lookup is waiting.
    pub async fn entered(&self) {
        self.entered.notified().await
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let held = *self.held.borrow();
        if held {
            self.entered.notify_one();
            let mut rx = self.held.subscribe();
            let _ = rx.wait_for(|held| !*held).await;
        }
        self.inner.get(collection, id).await
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        self.inner.set(collection, id, document).await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<DocumentId> {
        self.inner.insert(collection, document).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.inner.delete(collection, id).await
    }

    async fn list(
        &self,
        collection: &str,
        order_by: Option<&OrderBy>,
    ) -> Result<Vec<(DocumentId, Document)>> {
        self.inner.list(collection, order_by).await
    }
}

/// Provider whose identity stream is driven by the test.
pub struct ScriptedProvider {
    tx: AuthStateSender,
    rx: Mutex<Option<AuthStateReceiver>>,
}

impl ScriptedProvider {
    /// Queue the notifications before anyone subscribes.
    pub fn new(events: Vec<Option<Identity>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in events {
            tx.send(event).unwrap();
        }
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl AuthProvider for ScriptedProvider {
    fn auth_state_changes(&self) -> AuthStateReceiver {
        self.rx.lock().take().expect("single subscriber")
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Identity> {
        Err(ErrorKind::Provider("scripted".into()).into())
    }

    async fn create_user(&self, _email: &str, _password: &str) -> Result<Identity> {
        Err(ErrorKind::Provider("scripted".into()).into())
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str) -> Result<()> {
        Ok(())
    }
}
