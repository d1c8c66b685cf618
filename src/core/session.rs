use std::cell::Cell;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::{oneshot, watch};
use tracing_futures::Instrument;

use crate::common::{debug, info, warn, Result};
use crate::core::observer::Observers;
use crate::core::privilege::PrivilegeResolver;
use crate::core::{AdminGate, Admission, Config, Identity, Privilege, SessionState, Subscription};
use crate::provider::{AuthProvider, AuthStateReceiver};
use crate::store::SharedStore;

/// Single source of truth for who is signed in and whether they are an admin.
///
/// The handle is cheap to clone; clones share the same session. Independent
/// authorities can coexist, each with its own provider subscription.
#[derive(Clone)]
pub struct SessionAuthority {
    inner: Arc<Inner>,
}

struct Inner {
    provider: Arc<dyn AuthProvider>,
    privileges: PrivilegeResolver,
    config: Config,
    state: Mutex<SessionState>,
    observers: Observers,
    changes: watch::Sender<SessionState>,
    // Held while a change is published and while a subscriber is added.
    // True once the first state has been published.
    published: ReentrantMutex<Cell<bool>>,
    // Flipped once the first provider notification has been applied.
    ready: watch::Sender<bool>,
    // Dropping it stops the listener.
    _shutdown: oneshot::Sender<()>,
}

impl SessionAuthority {
    /// Subscribe to the provider and spawn the listener applying its
    /// notifications. Must be called within a tokio runtime.
    pub fn start(provider: Arc<dyn AuthProvider>, store: SharedStore, config: Config) -> Self {
        let (changes, _) = watch::channel(SessionState::unresolved());
        let (ready, _) = watch::channel(false);
        let (shutdown_tx, shutdown) = oneshot::channel();
        let privileges = PrivilegeResolver::new(store, config.privilege_collection());

        let inner = Arc::new(Inner {
            provider,
            privileges,
            config,
            state: Mutex::new(SessionState::unresolved()),
            observers: Observers::default(),
            changes,
            published: ReentrantMutex::new(Cell::new(false)),
            ready,
            _shutdown: shutdown_tx,
        });

        let listener = Listener {
            inner: Arc::downgrade(&inner),
            events: inner.provider.auth_state_changes(),
            shutdown,
        };
        tokio::spawn(listener.run().instrument(tracing::info_span!("session_listener")));

        Self { inner }
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.inner.state.lock().clone()
    }

    /// Register a callback invoked on every state change.
    ///
    /// When a state has already been published the callback is invoked right
    /// away with the current state, otherwise first with the next published
    /// one. Either way it sees each state once.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let callback = Arc::new(on_change);

        let published = self.inner.published.lock();
        let subscription = self.inner.observers.register(callback.clone());
        if published.get() {
            callback(&self.state());
        }
        subscription
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.len()
    }

    /// Channel based view of the state.
    pub fn changes(&self) -> watch::Receiver<SessionState> {
        self.inner.changes.subscribe()
    }

    /// Wait until no privilege lookup is in flight.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.changes();
        loop {
            {
                let state = rx.borrow_and_update();
                if !state.resolving {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Admission for management operations. It stays valid only while this
    /// session keeps reporting the same admin user.
    pub fn admission(&self) -> Result<Admission> {
        let identity = AdminGate::admit(&self.state())?;
        Ok(Admission::new(identity, self.changes()))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        self.ready().await;

        let identity = self
            .inner
            .provider
            .sign_in(email, password)
            .await
            .map_err(|err| {
                warn!(%email, "Sign in failed {}", err);
                err
            })?;

        let state = self.inner.apply(Some(identity.clone())).await;
        info!(user=%identity, phase=%state.phase(), "Signed in");

        Ok(identity)
    }

    /// Create an account. Unless disabled in config, the new account is
    /// granted admin rights by writing its privilege record.
    pub async fn signup(&self, email: &str, password: &str, display_name: &str) -> Result<Identity> {
        self.ready().await;

        let identity = self
            .inner
            .provider
            .create_user(email, password)
            .await
            .map_err(|err| {
                warn!(%email, "Sign up failed {}", err);
                err
            })?;

        let granted = if self.inner.config.grant_admin_on_signup() {
            self.inner
                .privileges
                .grant(&identity, display_name)
                .await
                .map(|_| ())
        } else {
            Ok(())
        };

        // The provider has signed the account in even when the grant failed.
        let state = self.inner.apply(Some(identity.clone())).await;
        if let Err(err) = granted {
            warn!(user=%identity, phase=%state.phase(), "Privilege grant failed {}", err);
            return Err(err);
        }
        info!(user=%identity, phase=%state.phase(), "Signed up");

        Ok(identity)
    }

    /// Local state is cleared only when the provider sign out succeeds.
    pub async fn logout(&self) -> Result<()> {
        self.ready().await;

        self.inner.provider.sign_out().await.map_err(|err| {
            warn!("Sign out failed {}", err);
            err
        })?;

        self.inner.apply(None).await;
        info!("Signed out");

        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<()> {
        self.inner.provider.send_password_reset(email).await?;
        info!(%email, "Password reset email requested");
        Ok(())
    }

    // Mutations wait for the initial provider state so it can never
    // overwrite their result.
    async fn ready(&self) {
        let mut rx = self.inner.ready.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Inner {
    async fn apply(&self, identity: Option<Identity>) -> SessionState {
        let identity = match identity {
            Some(identity) => identity,
            None => {
                return self.publish(|state| {
                    *state = SessionState::anonymous();
                    true
                })
            }
        };

        self.publish(|state| {
            if state.identity.as_ref() != Some(&identity) {
                state.identity = Some(identity.clone());
                state.privilege = Privilege::Denied;
            }
            state.resolving = true;
            true
        });

        let privilege = self.privileges.resolve(&identity).await;
        debug!(user=%identity, ?privilege, "Privilege resolved");

        // A lookup finishing after the identity changed again is stale.
        self.publish(|state| {
            if state.identity.as_ref() != Some(&identity) {
                return false;
            }
            state.privilege = privilege;
            state.resolving = false;
            true
        })
    }

    fn publish(&self, update: impl FnOnce(&mut SessionState) -> bool) -> SessionState {
        let published = self.published.lock();
        let (changed, snapshot) = {
            let mut state = self.state.lock();
            let changed = update(&mut state);
            (changed, state.clone())
        };
        if changed {
            published.set(true);
            self.changes.send_replace(snapshot.clone());
            self.observers.notify(&snapshot);
        }
        snapshot
    }
}

struct Listener {
    inner: Weak<Inner>,
    events: AuthStateReceiver,
    shutdown: oneshot::Receiver<()>,
}

impl Listener {
    // Notifications are applied one at a time, in provider order. Queued
    // notifications superseded by a later one are skipped.
    async fn run(mut self) {
        loop {
            let mut identity = tokio::select! {
                event = self.events.recv() => match event {
                    Some(identity) => identity,
                    None => break,
                },
                _ = &mut self.shutdown => break,
            };
            while let Ok(next) = self.events.try_recv() {
                identity = next;
            }

            let inner = match self.inner.upgrade() {
                Some(inner) => inner,
                None => break,
            };
            debug!(user=?identity.as_ref().map(|i| i.email.as_str()), "Auth state changed");

            inner.apply(identity).await;
            inner.ready.send_replace(true);
        }
        debug!("Auth state listener stopped");
    }
}
